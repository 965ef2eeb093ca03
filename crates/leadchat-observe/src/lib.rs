//! Observability for leadchat: structured logging and optional trace export.

pub mod tracing_setup;
