//! Form repository trait definition.

use leadchat_types::error::RepositoryError;
use leadchat_types::form::{FormDefinition, FormId};

/// Repository trait for form persistence.
///
/// Implementations live in leadchat-infra (e.g., SqliteStore, InMemoryStore).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
///
/// Slugs must be unique among published forms; `create` and `update` return
/// `RepositoryError::Conflict` when a write would break that.
pub trait FormRepository: Send + Sync {
    /// Create a new form. Returns the created form.
    fn create(
        &self,
        form: &FormDefinition,
    ) -> impl std::future::Future<Output = Result<FormDefinition, RepositoryError>> + Send;

    /// Get a form by its unique ID.
    fn get_by_id(
        &self,
        id: &FormId,
    ) -> impl std::future::Future<Output = Result<Option<FormDefinition>, RepositoryError>> + Send;

    /// Get a form by slug. A published form wins over drafts sharing the slug.
    fn get_by_slug(
        &self,
        slug: &str,
    ) -> impl std::future::Future<Output = Result<Option<FormDefinition>, RepositoryError>> + Send;

    /// List all forms in insertion order.
    fn list(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<FormDefinition>, RepositoryError>> + Send;

    /// Replace the editable fields of an existing form.
    ///
    /// Counters and `created_at` are never overwritten; the returned form
    /// carries the stored values.
    fn update(
        &self,
        form: &FormDefinition,
    ) -> impl std::future::Future<Output = Result<FormDefinition, RepositoryError>> + Send;

    /// Delete a form and all of its leads. Returns whether a form was removed.
    fn delete(
        &self,
        id: &FormId,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Atomically add one to `view_count`.
    fn increment_views(
        &self,
        id: &FormId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
