//! Backend selection.
//!
//! `StoreBackend` lets the binary pick a store from configuration while the
//! service stays generic over the repository traits.

use leadchat_core::repository::form::FormRepository;
use leadchat_core::repository::lead::LeadRepository;
use leadchat_types::config::StorageBackendKind;
use leadchat_types::error::RepositoryError;
use leadchat_types::form::{FormDefinition, FormId};
use leadchat_types::lead::Lead;
use tracing::info;

use crate::memory::InMemoryStore;
use crate::sqlite::SqliteStore;
use crate::sqlite::pool::DatabasePool;

/// The configured form and lead store.
#[derive(Clone)]
pub enum StoreBackend {
    Sqlite(SqliteStore),
    Memory(InMemoryStore),
}

impl StoreBackend {
    /// Build the store selected by `kind`. SQLite shares the application pool.
    pub fn new(kind: StorageBackendKind, pool: &DatabasePool) -> Self {
        info!(backend = %kind, "form store selected");
        match kind {
            StorageBackendKind::Sqlite => StoreBackend::Sqlite(SqliteStore::new(pool.clone())),
            StorageBackendKind::Memory => StoreBackend::Memory(InMemoryStore::new()),
        }
    }

    pub fn kind(&self) -> StorageBackendKind {
        match self {
            StoreBackend::Sqlite(_) => StorageBackendKind::Sqlite,
            StoreBackend::Memory(_) => StorageBackendKind::Memory,
        }
    }
}

impl FormRepository for StoreBackend {
    async fn create(&self, form: &FormDefinition) -> Result<FormDefinition, RepositoryError> {
        match self {
            StoreBackend::Sqlite(s) => FormRepository::create(s, form).await,
            StoreBackend::Memory(s) => FormRepository::create(s, form).await,
        }
    }

    async fn get_by_id(&self, id: &FormId) -> Result<Option<FormDefinition>, RepositoryError> {
        match self {
            StoreBackend::Sqlite(s) => s.get_by_id(id).await,
            StoreBackend::Memory(s) => s.get_by_id(id).await,
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<FormDefinition>, RepositoryError> {
        match self {
            StoreBackend::Sqlite(s) => s.get_by_slug(slug).await,
            StoreBackend::Memory(s) => s.get_by_slug(slug).await,
        }
    }

    async fn list(&self) -> Result<Vec<FormDefinition>, RepositoryError> {
        match self {
            StoreBackend::Sqlite(s) => FormRepository::list(s).await,
            StoreBackend::Memory(s) => FormRepository::list(s).await,
        }
    }

    async fn update(&self, form: &FormDefinition) -> Result<FormDefinition, RepositoryError> {
        match self {
            StoreBackend::Sqlite(s) => s.update(form).await,
            StoreBackend::Memory(s) => s.update(form).await,
        }
    }

    async fn delete(&self, id: &FormId) -> Result<bool, RepositoryError> {
        match self {
            StoreBackend::Sqlite(s) => s.delete(id).await,
            StoreBackend::Memory(s) => s.delete(id).await,
        }
    }

    async fn increment_views(&self, id: &FormId) -> Result<(), RepositoryError> {
        match self {
            StoreBackend::Sqlite(s) => s.increment_views(id).await,
            StoreBackend::Memory(s) => s.increment_views(id).await,
        }
    }
}

impl LeadRepository for StoreBackend {
    async fn create(&self, lead: &Lead) -> Result<Lead, RepositoryError> {
        match self {
            StoreBackend::Sqlite(s) => LeadRepository::create(s, lead).await,
            StoreBackend::Memory(s) => LeadRepository::create(s, lead).await,
        }
    }

    async fn list(&self, form_id: Option<&FormId>) -> Result<Vec<Lead>, RepositoryError> {
        match self {
            StoreBackend::Sqlite(s) => LeadRepository::list(s, form_id).await,
            StoreBackend::Memory(s) => LeadRepository::list(s, form_id).await,
        }
    }
}
