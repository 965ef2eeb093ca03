//! Public form lookup and chat sessions (no auth).
//!
//! A visitor opens a published form by slug, starts a session, then posts
//! one answer at a time. Each request awaits the whole turn, pacing included,
//! and answers with the updated transcript. Turns run on their own task, so a
//! client that disconnects mid-turn cannot leave a session half updated.
//! A completed session is dropped from the registry.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use leadchat_types::chat::{ChatSnapshot, ChatStep, TurnOutcome};
use leadchat_types::error::ChatError;
use leadchat_types::form::{FormDefinition, LeadMagnetKind};

use crate::http::error::AppError;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::{AppState, ChatSession};

/// What a visitor may see of a form before converting.
///
/// The lead magnet URL stays hidden until the conversation completes.
#[derive(Debug, Serialize)]
pub struct PublicForm {
    pub title: String,
    pub slug: String,
    pub magnet_title: String,
    pub magnet_description: String,
    pub magnet_kind: LeadMagnetKind,
    pub magnet_cover_image: Option<String>,
}

impl From<&FormDefinition> for PublicForm {
    fn from(form: &FormDefinition) -> Self {
        Self {
            title: form.title.clone(),
            slug: form.slug.clone(),
            magnet_title: form.lead_magnet.title.clone(),
            magnet_description: form.lead_magnet.description.clone(),
            magnet_kind: form.lead_magnet.kind,
            magnet_cover_image: form.lead_magnet.cover_image.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<TurnOutcome>,
    #[serde(flatten)]
    pub snapshot: ChatSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct SendMessage {
    pub text: String,
}

fn session_links(resp: ApiResponse<SessionView>) -> ApiResponse<SessionView> {
    let id = resp
        .data
        .as_ref()
        .map(|view| view.session_id.to_string())
        .unwrap_or_default();
    resp.with_link("self", &format!("/api/v1/public/sessions/{id}"))
        .with_link("messages", &format!("/api/v1/public/sessions/{id}/messages"))
}

fn find_session(state: &AppState, id: &str) -> Result<(Uuid, Arc<Mutex<ChatSession>>), AppError> {
    let id: Uuid = id.parse().map_err(|_| AppError::SessionNotFound)?;
    let session = state.sessions.checkout(&id).ok_or(AppError::SessionNotFound)?;
    Ok((id, session))
}

fn turn_aborted(e: tokio::task::JoinError) -> AppError {
    AppError::Internal(format!("chat turn aborted: {e}"))
}

/// GET /api/v1/public/forms/{slug} - A published form's landing details.
pub async fn get_public_form(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<PublicForm>>, AppError> {
    let timer = RequestTimer::start();
    let form = state.form_service.get_public_form(&slug).await?;
    Ok(Json(
        timer
            .success(PublicForm::from(&form))
            .with_link("sessions", &format!("/api/v1/public/forms/{}/sessions", form.slug)),
    ))
}

/// POST /api/v1/public/forms/{slug}/sessions - Start a conversation.
///
/// Counts one view and returns once the name prompt has been shown.
pub async fn create_session(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<(StatusCode, Json<ApiResponse<SessionView>>), AppError> {
    let timer = RequestTimer::start();
    let form = state.form_service.get_public_form(&slug).await?;

    let mut engine = state.new_chat_session(form);
    let sessions = state.sessions.clone();
    let (session_id, snapshot) = tokio::spawn(async move {
        engine.start().await?;
        let snapshot = engine.snapshot();
        Ok::<_, ChatError>((sessions.insert(engine), snapshot))
    })
    .await
    .map_err(turn_aborted)??;
    tracing::info!(%session_id, slug = %slug, "chat session started");

    let view = SessionView {
        session_id,
        outcome: None,
        snapshot,
    };

    Ok((StatusCode::CREATED, Json(session_links(timer.success(view)))))
}

/// GET /api/v1/public/sessions/{id} - Current transcript and state.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    let timer = RequestTimer::start();
    let (session_id, session) = find_session(&state, &id)?;
    let engine = session.try_lock().map_err(|_| ChatError::Busy)?;

    let view = SessionView {
        session_id,
        outcome: None,
        snapshot: engine.snapshot(),
    };
    Ok(Json(session_links(timer.success(view))))
}

/// POST /api/v1/public/sessions/{id}/messages - Answer the current prompt.
///
/// `409 SESSION_BUSY` while a previous answer is still being processed.
pub async fn post_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SendMessage>,
) -> Result<Json<ApiResponse<SessionView>>, AppError> {
    let timer = RequestTimer::start();
    let (session_id, session) = find_session(&state, &id)?;
    let mut engine = session.try_lock_owned().map_err(|_| ChatError::Busy)?;

    let sessions = state.sessions.clone();
    let (outcome, snapshot) = tokio::spawn(async move {
        let outcome = engine.submit(&body.text).await;
        if engine.step() == ChatStep::Complete && sessions.remove(&session_id) {
            tracing::info!(%session_id, "chat session completed");
        }
        (outcome, engine.snapshot())
    })
    .await
    .map_err(turn_aborted)?;

    let view = SessionView {
        session_id,
        outcome: Some(outcome?),
        snapshot,
    };
    Ok(Json(session_links(timer.success(view))))
}
