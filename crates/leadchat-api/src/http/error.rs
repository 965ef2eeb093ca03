//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use leadchat_types::error::{ChatError, FormError, LeadError};

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Form-related errors.
    Form(FormError),
    /// Lead-related errors.
    Lead(LeadError),
    /// Conversation misuse (busy, closed, empty input).
    Chat(ChatError),
    /// Unknown chat session id.
    SessionNotFound,
    /// Authentication failure.
    Unauthorized(String),
    /// Generic internal error.
    Internal(String),
}

impl From<FormError> for AppError {
    fn from(e: FormError) -> Self {
        AppError::Form(e)
    }
}

impl From<LeadError> for AppError {
    fn from(e: LeadError) -> Self {
        AppError::Lead(e)
    }
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl AppError {
    /// Status, machine-readable code and message for this error.
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Form(FormError::NotFound) | AppError::Lead(LeadError::FormNotFound) => {
                (StatusCode::NOT_FOUND, "FORM_NOT_FOUND", "Form not found".to_string())
            }
            AppError::Form(FormError::Unpublished) => (
                StatusCode::NOT_FOUND,
                "FORM_UNAVAILABLE",
                "This form is not available".to_string(),
            ),
            AppError::Form(FormError::SlugConflict(slug)) => (
                StatusCode::CONFLICT,
                "SLUG_CONFLICT",
                format!("Slug '{slug}' already exists"),
            ),
            AppError::Form(FormError::Validation(msg)) | AppError::Lead(LeadError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Lead(LeadError::InvalidEmail(email)) => (
                StatusCode::BAD_REQUEST,
                "INVALID_EMAIL",
                format!("'{email}' is not a valid email"),
            ),
            AppError::Form(e @ FormError::Storage(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", e.to_string())
            }
            AppError::Lead(e @ LeadError::Storage(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", e.to_string())
            }
            AppError::Chat(ChatError::EmptyInput) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "Message text is empty".to_string())
            }
            AppError::Chat(ChatError::Busy) => (
                StatusCode::CONFLICT,
                "SESSION_BUSY",
                "The previous message is still being processed".to_string(),
            ),
            AppError::Chat(e @ ChatError::InputClosed(_)) => {
                (StatusCode::CONFLICT, "INPUT_CLOSED", e.to_string())
            }
            AppError::Chat(e @ ChatError::AlreadyStarted) => {
                (StatusCode::CONFLICT, "SESSION_STARTED", e.to_string())
            }
            AppError::SessionNotFound => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                "Chat session not found".to_string(),
            ),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        if status.is_server_error() {
            tracing::error!(code, %message, "request failed");
        }

        let body = serde_json::to_string(&ApiResponse::error(code, &message)).unwrap_or_else(|_| {
            r#"{"errors":[{"code":"SERIALIZATION_ERROR","message":"Failed to serialize response"}]}"#
                .to_string()
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}
