//! Query parameter extractors for list endpoints.

use serde::Deserialize;

/// Query parameters for `GET /leads`.
#[derive(Debug, Deserialize, Default)]
pub struct LeadListQuery {
    /// Restrict to one form, by id or slug.
    pub form: Option<String>,
}
