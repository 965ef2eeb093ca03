use thiserror::Error;

use crate::chat::ChatStep;

/// Errors related to form operations.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("form not found")]
    NotFound,

    #[error("form is not available publicly")]
    Unpublished,

    #[error("slug '{0}' already exists")]
    SlugConflict(String),

    #[error("invalid form: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Errors related to lead capture.
#[derive(Debug, Error)]
pub enum LeadError {
    #[error("form not found")]
    FormNotFound,

    #[error("invalid email: '{0}'")]
    InvalidEmail(String),

    #[error("invalid lead: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Misuse of a conversation engine. None of these change the engine state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("input is empty")]
    EmptyInput,

    #[error("input is closed in step '{0}'")]
    InputClosed(ChatStep),

    #[error("a previous message is still being processed")]
    Busy,

    #[error("conversation already started")]
    AlreadyStarted,
}

/// Errors from repository operations (used by trait definitions in leadchat-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}
