//! Scripted conversation: the engine that walks a visitor from the welcome
//! message to a captured lead, its event bus, localized copy, and the port
//! it uses to record views and leads.

pub mod bus;
pub mod capture;
pub mod copy;
pub mod engine;
