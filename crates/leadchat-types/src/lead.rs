//! Lead types: a visitor's completed submission for one form.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::form::FormId;

/// Basic `local@domain.tld` shape: no whitespace, exactly one `@`, a dot after it.
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Whether `candidate` looks like an email address.
///
/// ```
/// use leadchat_types::lead::is_valid_email;
///
/// assert!(is_valid_email("bob@x.com"));
/// assert!(!is_valid_email("not-an-email"));
/// ```
pub fn is_valid_email(candidate: &str) -> bool {
    EMAIL_PATTERN.is_match(candidate)
}

/// A captured lead. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: Uuid,
    pub form_id: FormId,
    pub name: String,
    pub email: String,
    /// Answer to the form's custom question, if it has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_answer: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload submitted when a conversation finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateLeadRequest {
    pub form_id: FormId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub custom_answer: Option<String>,
}

impl CreateLeadRequest {
    /// Stamp the request with a fresh id and creation time.
    pub fn into_lead(self) -> Lead {
        Lead {
            id: Uuid::now_v7(),
            form_id: self.form_id,
            name: self.name,
            email: self.email,
            custom_answer: self.custom_answer,
            created_at: Utc::now(),
        }
    }
}
