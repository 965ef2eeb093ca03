//! Dashboard statistics handler.

use axum::Json;
use axum::extract::State;

use leadchat_types::form::DashboardStats;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// GET /api/v1/stats - Totals and per-form conversion rates.
pub async fn get_stats(
    State(state): State<AppState>,
    _auth: Authenticated,
) -> Result<Json<ApiResponse<DashboardStats>>, AppError> {
    let timer = RequestTimer::start();
    let stats = state.form_service.dashboard_stats().await?;
    Ok(Json(
        timer
            .success(stats)
            .with_link("self", "/api/v1/stats")
            .with_link("forms", "/api/v1/forms"),
    ))
}
