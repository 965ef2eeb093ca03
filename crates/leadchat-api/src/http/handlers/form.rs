//! Form editor handlers for the REST API (owner only).

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use leadchat_types::error::FormError;
use leadchat_types::form::{CreateFormRequest, FormDefinition, UpdateFormRequest};

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

fn form_response(
    timer: RequestTimer,
    form: FormDefinition,
) -> ApiResponse<FormDefinition> {
    let self_link = format!("/api/v1/forms/{}", form.id);
    let leads_link = format!("/api/v1/forms/{}/leads", form.id);
    let public_link = format!("/api/v1/public/forms/{}", form.slug);
    let published = form.published;

    let resp = timer
        .success(form)
        .with_link("self", &self_link)
        .with_link("leads", &leads_link);
    if published {
        resp.with_link("public", &public_link)
    } else {
        resp
    }
}

/// POST /api/v1/forms - Create a new form.
pub async fn create_form(
    State(state): State<AppState>,
    _auth: Authenticated,
    Json(body): Json<CreateFormRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FormDefinition>>), AppError> {
    let timer = RequestTimer::start();
    let form = state.form_service.create_form(body).await?;
    Ok((StatusCode::CREATED, Json(form_response(timer, form))))
}

/// GET /api/v1/forms - List forms in creation order.
pub async fn list_forms(
    State(state): State<AppState>,
    _auth: Authenticated,
) -> Result<Json<ApiResponse<Vec<FormDefinition>>>, AppError> {
    let timer = RequestTimer::start();
    let forms = state.form_service.list_forms().await?;
    Ok(Json(timer.success(forms).with_link("self", "/api/v1/forms")))
}

/// GET /api/v1/forms/{id} - Get a form by ID or slug.
pub async fn get_form(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id_or_slug): Path<String>,
) -> Result<Json<ApiResponse<FormDefinition>>, AppError> {
    let timer = RequestTimer::start();
    let form = state.form_service.resolve_form(&id_or_slug).await?;
    Ok(Json(form_response(timer, form)))
}

/// PUT /api/v1/forms/{id} - Partially update a form.
pub async fn update_form(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id_or_slug): Path<String>,
    Json(body): Json<UpdateFormRequest>,
) -> Result<Json<ApiResponse<FormDefinition>>, AppError> {
    let timer = RequestTimer::start();
    let form = state.form_service.resolve_form(&id_or_slug).await?;
    let updated = state.form_service.update_form(&form.id, body).await?;
    Ok(Json(form_response(timer, updated)))
}

/// POST /api/v1/forms/{id}/publish
pub async fn publish_form(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id_or_slug): Path<String>,
) -> Result<Json<ApiResponse<FormDefinition>>, AppError> {
    set_published(state, &id_or_slug, true).await
}

/// POST /api/v1/forms/{id}/unpublish
pub async fn unpublish_form(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id_or_slug): Path<String>,
) -> Result<Json<ApiResponse<FormDefinition>>, AppError> {
    set_published(state, &id_or_slug, false).await
}

async fn set_published(
    state: AppState,
    id_or_slug: &str,
    published: bool,
) -> Result<Json<ApiResponse<FormDefinition>>, AppError> {
    let timer = RequestTimer::start();
    let form = state.form_service.resolve_form(id_or_slug).await?;
    let updated = state.form_service.set_published(&form.id, published).await?;
    Ok(Json(form_response(timer, updated)))
}

/// DELETE /api/v1/forms/{id} - Delete a form and its leads.
///
/// Deleting an unknown form succeeds with `deleted: false`.
pub async fn delete_form(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id_or_slug): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let timer = RequestTimer::start();

    let deleted = match state.form_service.resolve_form(&id_or_slug).await {
        Ok(form) => state.form_service.delete_form(&form.id).await?,
        Err(FormError::NotFound) => false,
        Err(e) => return Err(e.into()),
    };

    Ok(Json(timer.success(serde_json::json!({
        "id": id_or_slug,
        "deleted": deleted,
    }))))
}
