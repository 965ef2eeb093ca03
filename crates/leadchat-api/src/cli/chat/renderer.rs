//! Turns conversation events into terminal output.
//!
//! `ChatRenderer` keeps at most one spinner alive (typing or saving) and
//! prints bot messages as they land. Visitor lines are already echoed by
//! the input editor, so user messages are not printed again.

use console::style;
use indicatif::ProgressBar;

use leadchat_types::chat::{ChatEvent, MagnetAccess, MessageRole};

use crate::cli::spinner;

pub struct ChatRenderer {
    bot_name: String,
    spinner: Option<ProgressBar>,
}

impl ChatRenderer {
    pub fn new(bot_name: impl Into<String>) -> Self {
        Self {
            bot_name: bot_name.into(),
            spinner: None,
        }
    }

    /// Render one event.
    pub fn handle(&mut self, event: &ChatEvent) {
        match event {
            ChatEvent::Typing { active: true } => self.show_spinner("typing..."),
            ChatEvent::Submitting { active: true } => self.show_spinner("saving..."),
            ChatEvent::Typing { active: false } | ChatEvent::Submitting { active: false } => {
                self.clear_spinner()
            }
            ChatEvent::Message { message } if message.role == MessageRole::Bot => {
                self.clear_spinner();
                println!(
                    "  {} {}",
                    style(format!("{}:", self.bot_name)).cyan().bold(),
                    message.content
                );
            }
            ChatEvent::Message { .. } => {}
            ChatEvent::StepChanged { step } => {
                tracing::debug!(%step, "rendering step");
            }
            ChatEvent::Completed { access } => {
                self.clear_spinner();
                print_magnet(access);
            }
        }
    }

    /// Drop any spinner still on screen.
    pub fn finish(&mut self) {
        self.clear_spinner();
    }

    fn show_spinner(&mut self, message: &str) {
        self.clear_spinner();
        self.spinner = spinner("cyan", format!("  {message}")).ok();
    }

    fn clear_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

/// The material card shown after a successful conversion.
fn print_magnet(access: &MagnetAccess) {
    let magnet = &access.magnet;
    println!();
    println!("  {}", style("┌──────────────────────────────").green());
    println!("  {} 🎁 {}", style("│").green(), style(&magnet.title).bold());
    if !magnet.description.is_empty() {
        println!("  {} {}", style("│").green(), style(&magnet.description).dim());
    }
    println!("  {}", style("│").green());
    println!(
        "  {} {} {}",
        style("│").green(),
        style(format!("[ {} ]", access.action_label)).green().bold(),
        style(&magnet.url).underlined()
    );
    println!("  {}", style("└──────────────────────────────").green());
    println!();
}
