//! Main chat loop orchestration.
//!
//! Resolves the form, prints the banner, starts the engine and then feeds
//! it one visitor answer at a time until the conversation completes or the
//! visitor leaves. Engine events are rendered while each turn is running.

use std::future::Future;

use console::style;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};

use leadchat_core::chat::capture::{LeadCapture, PreviewCapture};
use leadchat_core::chat::engine::ConversationEngine;
use leadchat_types::chat::{ChatEvent, TurnOutcome};
use leadchat_types::error::{ChatError, FormError};

use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::input::{ChatInput, InputEvent};
use super::renderer::ChatRenderer;

const BOT_NAME: &str = "Bot";

/// Fill in a published form as a visitor: the view is counted and the
/// lead stored.
pub async fn run_chat(state: &AppState, slug: &str) -> anyhow::Result<()> {
    let form = match state.form_service.get_public_form(slug).await {
        Ok(form) => form,
        Err(FormError::NotFound) => {
            println!("\n  {} Form not found.\n", style("?").yellow().bold());
            return Ok(());
        }
        Err(FormError::Unpublished) => {
            println!(
                "\n  {} This form is not available.\n",
                style("!").yellow().bold()
            );
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let engine = state.new_chat_session(form).with_completion_callback(|lead| {
        info!(form_id = %lead.form_id, lead_id = %lead.id, "lead captured from terminal chat");
    });
    run_conversation(engine, false).await
}

/// Run any form's conversation, published or not, without side effects.
pub async fn run_preview(state: &AppState, id_or_slug: &str) -> anyhow::Result<()> {
    let form = state.form_service.resolve_form(id_or_slug).await?;

    let engine = ConversationEngine::new(
        form,
        PreviewCapture,
        state.config.chat.pacing,
        state.config.chat.locale,
    )
    .with_completion_callback(|lead| {
        info!(form_id = %lead.form_id, email = %lead.email, "preview completed");
    });
    run_conversation(engine, true).await
}

async fn run_conversation<C: LeadCapture>(
    mut engine: ConversationEngine<C>,
    preview: bool,
) -> anyhow::Result<()> {
    print_welcome_banner(engine.form(), preview);

    let mut events = engine.subscribe();
    let mut renderer = ChatRenderer::new(BOT_NAME);

    drive(engine.start(), &mut events, |event| renderer.handle(event)).await?;

    let input = ChatInput::new(format!("  {} ", style("You >").green().bold()));

    while engine.accepts_input() {
        let text = match input.read_line().await? {
            InputEvent::Eof => {
                println!("\n  {}", style("Conversation ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D to leave, or keep answering.").dim());
                continue;
            }
            InputEvent::Message(text) if text.is_empty() => continue,
            InputEvent::Message(text) => text,
        };

        let turn = drive(engine.submit(&text), &mut events, |event| renderer.handle(event)).await;
        match turn {
            Ok(TurnOutcome::SubmissionFailed) => {
                warn!(form_id = %engine.form().id, "submission failed, waiting for retry");
            }
            Ok(_) | Err(ChatError::EmptyInput) => {}
            Err(e) => {
                renderer.finish();
                return Err(e.into());
            }
        }
    }

    renderer.finish();
    Ok(())
}

/// Await `turn` while passing every event it publishes to `on_event`.
///
/// Events still buffered when the turn finishes are delivered before
/// returning.
async fn drive<T>(
    turn: impl Future<Output = T>,
    events: &mut broadcast::Receiver<ChatEvent>,
    mut on_event: impl FnMut(&ChatEvent),
) -> T {
    tokio::pin!(turn);
    loop {
        tokio::select! {
            biased;
            received = events.recv() => match received {
                Ok(event) => on_event(&event),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "chat renderer fell behind"),
                Err(RecvError::Closed) => return turn.await,
            },
            output = &mut turn => {
                while let Ok(event) = events.try_recv() {
                    on_event(&event);
                }
                return output;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadchat_types::chat::{ChatStep, MessageRole};
    use leadchat_types::config::{ChatPacing, Locale};
    use leadchat_types::form::{FormDefinition, FormId, LeadMagnet, LeadMagnetKind};
    use uuid::Uuid;

    fn form() -> FormDefinition {
        FormDefinition {
            id: FormId::new(),
            title: "Ebook".to_string(),
            slug: "ebook".to_string(),
            welcome_message: "Hi!".to_string(),
            name_label: "Your name?".to_string(),
            email_label: "Thanks {name}, your email?".to_string(),
            custom_question: None,
            thank_you_message: "Enjoy!".to_string(),
            lead_magnet: LeadMagnet {
                id: Uuid::now_v7(),
                title: "Guide".to_string(),
                description: String::new(),
                kind: LeadMagnetKind::Link,
                url: "https://example.com".to_string(),
                cover_image: None,
            },
            published: false,
            view_count: 0,
            conversion_count: 0,
            created_at: chrono::Utc::now(),
        }
    }

    fn bot_lines(events: &[ChatEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|event| match event {
                ChatEvent::Message { message } if message.role == MessageRole::Bot => {
                    Some(message.content.clone())
                }
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_drive_delivers_every_event_of_a_turn() {
        let mut engine =
            ConversationEngine::new(form(), PreviewCapture, ChatPacing::instant(), Locale::English);
        let mut rx = engine.subscribe();

        let mut seen = Vec::new();
        drive(engine.start(), &mut rx, |event| seen.push(event.clone()))
            .await
            .unwrap();
        assert_eq!(bot_lines(&seen), vec!["Hi!", "Your name?"]);
        assert_eq!(seen.last(), Some(&ChatEvent::Typing { active: false }));

        seen.clear();
        let outcome = drive(engine.submit("Bob"), &mut rx, |event| seen.push(event.clone()))
            .await
            .unwrap();
        assert_eq!(outcome, TurnOutcome::Advanced { step: ChatStep::Email });
        assert_eq!(bot_lines(&seen), vec!["Thanks Bob, your email?"]);
    }

    #[tokio::test]
    async fn test_drive_reaches_the_magnet_in_preview() {
        let mut engine =
            ConversationEngine::new(form(), PreviewCapture, ChatPacing::instant(), Locale::English);
        let mut rx = engine.subscribe();
        drive(engine.start(), &mut rx, |_| {}).await.unwrap();
        drive(engine.submit("Bob"), &mut rx, |_| {}).await.unwrap();

        let mut completed = None;
        let outcome = drive(engine.submit("bob@x.com"), &mut rx, |event| {
            if let ChatEvent::Completed { access } = event {
                completed = Some(access.action_label.clone());
            }
        })
        .await
        .unwrap();

        assert!(matches!(outcome, TurnOutcome::Completed { .. }));
        assert_eq!(completed.as_deref(), Some("Open material"));
        assert!(!engine.accepts_input());
    }
}
