//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`. Owner routes require an API key;
//! `/api/v1/public/...` and `/health` do not.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Form editor
        .route(
            "/forms",
            get(handlers::form::list_forms).post(handlers::form::create_form),
        )
        .route(
            "/forms/{id}",
            get(handlers::form::get_form)
                .put(handlers::form::update_form)
                .delete(handlers::form::delete_form),
        )
        .route("/forms/{id}/publish", post(handlers::form::publish_form))
        .route("/forms/{id}/unpublish", post(handlers::form::unpublish_form))
        // Leads
        .route("/forms/{id}/leads", get(handlers::lead::list_form_leads))
        .route(
            "/forms/{id}/leads/export",
            get(handlers::lead::export_form_leads),
        )
        .route("/leads", get(handlers::lead::list_leads))
        // Dashboard stats
        .route("/stats", get(handlers::stats::get_stats))
        // Public conversation
        .route(
            "/public/forms/{slug}",
            get(handlers::public::get_public_form),
        )
        .route(
            "/public/forms/{slug}/sessions",
            post(handlers::public::create_session),
        )
        .route(
            "/public/sessions/{id}",
            get(handlers::public::get_session),
        )
        .route(
            "/public/sessions/{id}/messages",
            post(handlers::public::post_message),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use leadchat_infra::sqlite::pool::{DatabasePool, database_url};
    use std::time::Duration;
    use leadchat_types::config::{AppConfig, ChatPacing, StorageBackendKind};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn test_state(pacing: ChatPacing) -> (AppState, String) {
        let dir = tempfile::tempdir().unwrap().keep();
        let pool = DatabasePool::new(&database_url(&dir)).await.unwrap();

        let mut config = AppConfig::default();
        config.storage.backend = StorageBackendKind::Memory;
        config.chat.pacing = pacing;

        let state = AppState::from_parts(config, dir, pool);
        let key = state.api_keys.ensure_key().await.unwrap().unwrap();
        (state, key)
    }

    async fn test_app() -> (Router, String) {
        let (state, key) = test_state(ChatPacing::instant()).await;
        (build_router(state), key)
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        key: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(key) = key {
            builder = builder.header("x-api-key", key);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn create_published_form(app: &Router, key: &str, question: Option<&str>) -> Value {
        let (status, body) = send(
            app,
            "POST",
            "/api/v1/forms",
            Some(key),
            Some(json!({
                "title": "Free Ebook",
                "custom_question": question,
                "lead_magnet": { "title": "Ebook", "url": "https://example.com/ebook.pdf", "kind": "file" },
                "published": true
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"].clone()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let (app, _key) = test_app().await;
        let (status, body) = send(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_owner_routes_require_api_key() {
        let (app, _key) = test_app().await;

        let (status, body) = send(&app, "GET", "/api/v1/forms", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["errors"][0]["code"], "UNAUTHORIZED");

        let (status, _) = send(&app, "GET", "/api/v1/stats", Some("lchat_nope"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_form_applies_defaults_and_validates() {
        let (app, key) = test_app().await;
        let form = create_published_form(&app, &key, None).await;
        assert_eq!(form["slug"], "free-ebook");
        assert_eq!(form["welcome_message"], "Hi! 👋 I have something great for you!");

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/forms",
            Some(&key),
            Some(json!({ "title": "  ", "lead_magnet": { "title": "x", "url": "y" } })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unpublished_form_is_unavailable() {
        let (app, key) = test_app().await;
        let form = create_published_form(&app, &key, None).await;
        let id = form["id"].as_str().unwrap();

        let (status, _) = send(&app, "GET", "/api/v1/public/forms/free-ebook", None, None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/forms/{id}/unpublish"),
            Some(&key),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["published"], false);

        let (status, body) =
            send(&app, "POST", "/api/v1/public/forms/free-ebook/sessions", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errors"][0]["code"], "FORM_UNAVAILABLE");

        let (_, body) = send(&app, "GET", "/api/v1/public/forms/nope", None, None).await;
        assert_eq!(body["errors"][0]["code"], "FORM_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_public_conversation_captures_lead() {
        let (app, key) = test_app().await;
        let form = create_published_form(&app, &key, Some("Which team?")).await;
        let form_id = form["id"].as_str().unwrap();

        let (status, body) =
            send(&app, "POST", "/api/v1/public/forms/free-ebook/sessions", None, None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["step"], "name");
        let session = body["data"]["session_id"].as_str().unwrap().to_string();
        let messages_uri = format!("/api/v1/public/sessions/{session}/messages");

        let (_, body) = send(&app, "POST", &messages_uri, None, Some(json!({"text": "Bob"}))).await;
        assert_eq!(body["data"]["step"], "email");

        let (_, body) =
            send(&app, "POST", &messages_uri, None, Some(json!({"text": "nope"}))).await;
        assert_eq!(body["data"]["outcome"]["outcome"], "validation_failed");

        let (_, body) =
            send(&app, "POST", &messages_uri, None, Some(json!({"text": "bob@x.com"}))).await;
        assert_eq!(body["data"]["step"], "custom");
        assert_eq!(body["data"]["outcome"]["outcome"], "advanced");

        let (status, body) =
            send(&app, "POST", &messages_uri, None, Some(json!({"text": "Sales, Marketing"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["outcome"]["outcome"], "completed");
        assert_eq!(body["data"]["magnet"]["action_label"], "Download material");

        // Completed sessions leave the registry.
        let (status, body) =
            send(&app, "POST", &messages_uri, None, Some(json!({"text": "again"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errors"][0]["code"], "SESSION_NOT_FOUND");

        let (_, body) = send(&app, "GET", "/api/v1/stats", Some(&key), None).await;
        assert_eq!(body["data"]["total_views"], 1);
        assert_eq!(body["data"]["total_conversions"], 1);

        let (_, body) = send(
            &app,
            "GET",
            &format!("/api/v1/forms/{form_id}/leads"),
            Some(&key),
            None,
        )
        .await;
        assert_eq!(body["data"][0]["email"], "bob@x.com");
        assert_eq!(body["data"][0]["custom_answer"], "Sales, Marketing");
    }

    #[tokio::test]
    async fn test_dropped_request_still_finishes_turn() {
        let (state, key) = test_state(ChatPacing::default()).await;
        let app = build_router(state.clone());
        create_published_form(&app, &key, None).await;

        // Only the memory backend is touched from here on.
        tokio::time::pause();
        let (_, body) =
            send(&app, "POST", "/api/v1/public/forms/free-ebook/sessions", None, None).await;
        let session = body["data"]["session_id"].as_str().unwrap().to_string();
        let session_uri = format!("/api/v1/public/sessions/{session}");
        let messages_uri = format!("{session_uri}/messages");

        let cut = tokio::time::timeout(
            Duration::from_millis(600),
            send(&app, "POST", &messages_uri, None, Some(json!({"text": "Bob"}))),
        )
        .await;
        assert!(cut.is_err());
        tokio::time::sleep(Duration::from_secs(2)).await;

        let (status, body) = send(&app, "GET", &session_uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["step"], "email");
        assert_eq!(body["data"]["typing"], false);
        let messages = body["data"]["messages"].as_array().unwrap();
        assert_eq!(
            messages.last().unwrap()["content"],
            "Great, Bob! What's your best email?"
        );

        let cut = tokio::time::timeout(
            Duration::from_millis(100),
            send(&app, "POST", &messages_uri, None, Some(json!({"text": "bob@x.com"}))),
        )
        .await;
        assert!(cut.is_err());
        tokio::time::sleep(Duration::from_secs(2)).await;

        let leads = state.form_service.list_leads(None).await.unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(state.sessions.len(), 0);
        let (status, _) = send(&app, "GET", &session_uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_export_is_csv() {
        let (app, key) = test_app().await;
        let form = create_published_form(&app, &key, None).await;
        let id = form["id"].as_str().unwrap();

        let request = Request::builder()
            .uri(format!("/api/v1/forms/{id}/leads/export"))
            .header("authorization", format!("Bearer {key}"))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/csv"));
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("leads_free-ebook_"));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"Name,Email,Custom Answer,Date");
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let (app, _key) = test_app().await;
        let (status, body) = send(
            &app,
            "GET",
            &format!("/api/v1/public/sessions/{}", uuid::Uuid::now_v7()),
            None,
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errors"][0]["code"], "SESSION_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (app, key) = test_app().await;
        let form = create_published_form(&app, &key, None).await;
        let uri = format!("/api/v1/forms/{}", form["id"].as_str().unwrap());

        let (_, body) = send(&app, "DELETE", &uri, Some(&key), None).await;
        assert_eq!(body["data"]["deleted"], true);
        let (status, body) = send(&app, "DELETE", &uri, Some(&key), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["deleted"], false);
    }
}
