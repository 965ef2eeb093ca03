//! Owner authentication for the form editor and lead routes.
//!
//! The key travels as `Authorization: Bearer <key>` or `X-API-Key: <key>`
//! and is checked against the hashed keys in `ApiKeyStore`. Public chat
//! routes never extract this.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;

use crate::http::error::AppError;
use crate::state::AppState;

const HOW_TO_AUTHENTICATE: &str =
    "send the owner key as 'Authorization: Bearer <key>' or 'X-API-Key: <key>'";

/// Proof that the request carried a valid owner key.
pub struct Authenticated;

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let key = presented_key(&parts.headers)?
            .ok_or_else(|| AppError::Unauthorized(format!("Missing API key: {HOW_TO_AUTHENTICATE}")))?;

        let known = state
            .api_keys
            .verify(&key)
            .await
            .map_err(|e| AppError::Internal(format!("API key lookup failed: {e}")))?;

        if !known {
            tracing::debug!("rejected unknown owner key");
            return Err(AppError::Unauthorized(format!(
                "Unknown API key: {HOW_TO_AUTHENTICATE}"
            )));
        }
        Ok(Authenticated)
    }
}

/// The key from the first auth header present, bearer token first.
fn presented_key(headers: &HeaderMap) -> Result<Option<String>, AppError> {
    let header_text = |name: &str| -> Result<Option<String>, AppError> {
        headers
            .get(name)
            .map(|value| {
                value
                    .to_str()
                    .map(|text| text.trim().to_string())
                    .map_err(|_| AppError::Unauthorized(format!("{name} header is not valid text")))
            })
            .transpose()
    };

    if let Some(bearer) = header_text("authorization")?
        .as_deref()
        .and_then(|value| value.strip_prefix("Bearer "))
    {
        return Ok(Some(bearer.trim().to_string()));
    }
    Ok(header_text("x-api-key")?.filter(|key| !key.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_bearer_token_wins() {
        let map = headers(&[
            ("authorization", "Bearer lchat_abc"),
            ("x-api-key", "lchat_other"),
        ]);
        assert_eq!(presented_key(&map).unwrap().as_deref(), Some("lchat_abc"));
    }

    #[test]
    fn test_falls_back_to_x_api_key() {
        let map = headers(&[("authorization", "Basic Zm9v"), ("x-api-key", " lchat_k ")]);
        assert_eq!(presented_key(&map).unwrap().as_deref(), Some("lchat_k"));
    }

    #[test]
    fn test_no_key() {
        assert_eq!(presented_key(&HeaderMap::new()).unwrap(), None);
        assert_eq!(presented_key(&headers(&[("x-api-key", "  ")])).unwrap(), None);
    }
}
