//! Lead management handlers: per-form tables, all leads and CSV export.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use leadchat_core::service::export::export_file_name;
use leadchat_types::lead::Lead;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::extractors::query::LeadListQuery;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// GET /api/v1/forms/{id}/leads - Leads captured by one form.
pub async fn list_form_leads(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id_or_slug): Path<String>,
) -> Result<Json<ApiResponse<Vec<Lead>>>, AppError> {
    let timer = RequestTimer::start();
    let form = state.form_service.resolve_form(&id_or_slug).await?;
    let leads = state.form_service.list_leads(Some(&form.id)).await?;

    Ok(Json(
        timer
            .success(leads)
            .with_link("form", &format!("/api/v1/forms/{}", form.id))
            .with_link("export", &format!("/api/v1/forms/{}/leads/export", form.id)),
    ))
}

/// GET /api/v1/leads - All leads, optionally filtered with `?form=`.
pub async fn list_leads(
    State(state): State<AppState>,
    _auth: Authenticated,
    Query(query): Query<LeadListQuery>,
) -> Result<Json<ApiResponse<Vec<Lead>>>, AppError> {
    let timer = RequestTimer::start();

    let form_id = match &query.form {
        Some(id_or_slug) => Some(state.form_service.resolve_form(id_or_slug).await?.id),
        None => None,
    };
    let leads = state.form_service.list_leads(form_id.as_ref()).await?;

    Ok(Json(timer.success(leads).with_link("self", "/api/v1/leads")))
}

/// GET /api/v1/forms/{id}/leads/export - CSV download.
pub async fn export_form_leads(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id_or_slug): Path<String>,
) -> Result<Response, AppError> {
    let form = state.form_service.resolve_form(&id_or_slug).await?;
    let csv = state.form_service.export_leads_csv(&form.id).await?;
    let file_name = export_file_name(&form.slug, chrono::Utc::now().date_naive());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        csv,
    )
        .into_response())
}
