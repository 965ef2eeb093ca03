//! The JSON envelope shared by every endpoint:
//! ```json
//! {
//!   "data": { ... },
//!   "meta": { "request_id": "...", "timestamp": "...", "response_time_ms": 5 },
//!   "errors": [],
//!   "_links": { "self": "..." }
//! }
//! ```
//! Errors use the same envelope with `errors` filled and no `data`.

use std::collections::HashMap;
use std::time::Instant;

use serde::Serialize;
use uuid::Uuid;

/// `{data, meta, errors, _links}` wrapper around every JSON body.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    pub meta: ApiMeta,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ApiErrorDetail>,
    /// Related resources by relation name (`self`, `leads`, `public`, ...).
    #[serde(rename = "_links", skip_serializing_if = "HashMap::is_empty")]
    pub links: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct ApiMeta {
    pub request_id: String,
    /// RFC 3339, UTC.
    pub timestamp: String,
    pub response_time_ms: u64,
}

impl ApiMeta {
    fn stamped(request_id: String, response_time_ms: u64) -> Self {
        Self {
            request_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
            response_time_ms,
        }
    }
}

/// One failure: a stable machine code (`FORM_NOT_FOUND`, ...) and a message.
#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

/// Taken when a handler starts; turns its result into an envelope.
pub struct RequestTimer {
    started: Instant,
    request_id: Uuid,
}

impl RequestTimer {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            request_id: Uuid::now_v7(),
        }
    }

    pub fn success<T: Serialize>(self, data: T) -> ApiResponse<T> {
        let elapsed_ms = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        ApiResponse::success(data, self.request_id.to_string(), elapsed_ms)
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, request_id: String, response_time_ms: u64) -> Self {
        Self {
            data: Some(data),
            meta: ApiMeta::stamped(request_id, response_time_ms),
            errors: Vec::new(),
            links: HashMap::new(),
        }
    }

    pub fn with_link(mut self, rel: &str, href: &str) -> Self {
        self.links.insert(rel.to_owned(), href.to_owned());
        self
    }
}

impl ApiResponse<()> {
    /// Envelope carrying a single error and no data.
    pub fn error(code: &str, message: &str) -> Self {
        Self {
            data: None,
            meta: ApiMeta::stamped(Uuid::now_v7().to_string(), 0),
            errors: vec![ApiErrorDetail {
                code: code.to_owned(),
                message: message.to_owned(),
            }],
            links: HashMap::new(),
        }
    }
}
