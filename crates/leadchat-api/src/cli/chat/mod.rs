//! Interactive terminal chat for a form.
//!
//! Renders the scripted conversation as it happens: typing spinners, bot
//! messages, and the lead magnet once the visitor has converted. Entry
//! points: `loop_runner::run_chat` and `loop_runner::run_preview`.

pub mod banner;
pub mod input;
pub mod loop_runner;
pub mod renderer;
