//! HTTP/REST API layer for leadchat.
//!
//! Axum-based REST API at `/api/v1/`: owner routes behind API key
//! authentication, public conversation routes without, and the envelope
//! response format throughout.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
