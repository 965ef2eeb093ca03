//! Chat transcript types for the conversational form widget.
//!
//! These types describe what a presentation layer renders: the ordered
//! message log, the current step of the scripted conversation, and the
//! events emitted while the conversation progresses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::form::LeadMagnet;
use crate::lead::Lead;

/// Who authored a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    Bot,
    User,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::Bot => write!(f, "bot"),
            MessageRole::User => write!(f, "user"),
        }
    }
}

/// A single entry in the conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn bot(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Bot, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Step tag of the scripted conversation, in fixed order.
///
/// `Custom` only occurs for forms that define a custom question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatStep {
    Welcome,
    Name,
    Email,
    Custom,
    Complete,
}

impl ChatStep {
    /// Whether the visitor can type in this step.
    pub fn accepts_input(&self) -> bool {
        matches!(self, ChatStep::Name | ChatStep::Email | ChatStep::Custom)
    }
}

impl fmt::Display for ChatStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatStep::Welcome => write!(f, "welcome"),
            ChatStep::Name => write!(f, "name"),
            ChatStep::Email => write!(f, "email"),
            ChatStep::Custom => write!(f, "custom"),
            ChatStep::Complete => write!(f, "complete"),
        }
    }
}

impl FromStr for ChatStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "welcome" => Ok(ChatStep::Welcome),
            "name" => Ok(ChatStep::Name),
            "email" => Ok(ChatStep::Email),
            "custom" => Ok(ChatStep::Custom),
            "complete" => Ok(ChatStep::Complete),
            other => Err(format!("invalid chat step: '{other}'")),
        }
    }
}

/// What happened to one visitor turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// The answer was accepted and the conversation moved to `step`.
    Advanced { step: ChatStep },
    /// The email did not match the expected shape; the step is unchanged.
    ValidationFailed,
    /// Persisting the lead failed; the visitor may submit again.
    SubmissionFailed,
    /// The lead was stored and the conversation is over.
    Completed { lead: Lead },
}

/// The lead magnet offered when the conversation completes, with the
/// label of the access action ("Download material" / "Open material").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagnetAccess {
    pub magnet: LeadMagnet,
    pub action_label: String,
}

/// Events published while a conversation progresses.
///
/// A presentation layer subscribes to these to render typing indicators
/// and messages as they appear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// The bot started or stopped "typing".
    Typing { active: bool },
    /// A lead submission started or finished.
    Submitting { active: bool },
    /// A message was appended to the log.
    Message { message: ChatMessage },
    /// The conversation moved to a new step.
    StepChanged { step: ChatStep },
    /// The conversation finished and the lead magnet is available.
    Completed { access: MagnetAccess },
}

/// Serializable view of a conversation for polling clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSnapshot {
    pub step: ChatStep,
    pub messages: Vec<ChatMessage>,
    pub typing: bool,
    pub submitting: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magnet: Option<MagnetAccess>,
}
