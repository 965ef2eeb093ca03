//! Business logic and repository trait definitions for leadchat.
//!
//! This crate defines the "ports" (repository traits) that the infrastructure
//! layer implements, the form/lead service, CSV export, and the scripted
//! conversation engine. It depends only on `leadchat-types` -- never on
//! `leadchat-infra` or any database/IO crate.

pub mod chat;
pub mod repository;
pub mod service;
