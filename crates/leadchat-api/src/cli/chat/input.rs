//! Async readline input handling for the chat loop.
//!
//! Wraps `rustyline_async::Readline` for one answer at a time. The editor
//! is dropped once the line is read so the terminal leaves raw mode while
//! the bot is "typing".

use rustyline_async::{Readline, ReadlineError, ReadlineEvent};

/// Events produced by the input handler.
#[derive(Debug, PartialEq)]
pub enum InputEvent {
    /// Visitor submitted an answer.
    Message(String),
    /// End of file (Ctrl+D).
    Eof,
    /// Interrupt signal (Ctrl+C).
    Interrupted,
}

/// Reads visitor answers behind a fixed prompt.
pub struct ChatInput {
    prompt: String,
}

impl ChatInput {
    pub fn new(prompt: String) -> Self {
        Self { prompt }
    }

    /// Read one line of input.
    ///
    /// Returns `Message(text)` for a submitted line (trimmed), `Eof` for
    /// Ctrl+D and `Interrupted` for Ctrl+C.
    pub async fn read_line(&self) -> Result<InputEvent, ReadlineError> {
        let (mut rl, _writer) = Readline::new(self.prompt.clone())?;
        let event = match rl.readline().await? {
            ReadlineEvent::Line(line) => InputEvent::Message(line.trim().to_string()),
            ReadlineEvent::Eof => InputEvent::Eof,
            ReadlineEvent::Interrupted => InputEvent::Interrupted,
        };
        rl.flush()?;
        Ok(event)
    }
}
