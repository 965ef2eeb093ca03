//! HTTP request handlers for the REST API.

pub mod form;
pub mod lead;
pub mod public;
pub mod stats;
