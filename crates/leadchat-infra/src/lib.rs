//! Infrastructure layer for leadchat.
//!
//! Contains implementations of the repository traits defined in `leadchat-core`:
//! the SQLite store, the in-memory store and the backend selector, plus the
//! data directory, `config.toml` loader, API key storage and demo seed data.

pub mod config;
pub mod memory;
pub mod seed;
pub mod sqlite;
pub mod store;
