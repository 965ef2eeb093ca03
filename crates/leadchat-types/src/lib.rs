//! Shared domain types for leadchat.
//!
//! This crate contains the core domain types used across the workspace:
//! conversational forms, lead magnets, leads, chat transcript types,
//! configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror, regex.

pub mod chat;
pub mod config;
pub mod error;
pub mod form;
pub mod lead;
