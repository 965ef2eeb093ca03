//! Lead repository trait definition.

use leadchat_types::error::RepositoryError;
use leadchat_types::form::FormId;
use leadchat_types::lead::Lead;

/// Repository trait for lead persistence.
pub trait LeadRepository: Send + Sync {
    /// Store a lead and add one to its form's `conversion_count` in the same
    /// atomic step. Returns `RepositoryError::NotFound` if the form does not exist.
    fn create(
        &self,
        lead: &Lead,
    ) -> impl std::future::Future<Output = Result<Lead, RepositoryError>> + Send;

    /// List leads in insertion order, optionally for a single form.
    fn list(
        &self,
        form_id: Option<&FormId>,
    ) -> impl std::future::Future<Output = Result<Vec<Lead>, RepositoryError>> + Send;
}
