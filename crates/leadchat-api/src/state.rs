//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both the CLI and
//! the REST API. `FormService` is generic over the repository traits;
//! AppState pins it to the configured `StoreBackend`.

use std::path::PathBuf;
use std::sync::Arc;

use leadchat_core::chat::engine::ConversationEngine;
use leadchat_core::service::form::FormService;
use leadchat_infra::config::{load_app_config, resolve_data_dir};
use leadchat_infra::sqlite::api_key::ApiKeyStore;
use leadchat_infra::sqlite::pool::{DatabasePool, database_url};
use leadchat_infra::store::StoreBackend;
use leadchat_types::config::{AppConfig, StorageBackendKind};
use leadchat_types::form::FormDefinition;

use crate::sessions::SessionRegistry;

/// `FormService` pinned to the configured backend for both repositories.
pub type ConcreteFormService = FormService<StoreBackend, StoreBackend>;

/// A live conversation served over HTTP.
pub type ChatSession = ConversationEngine<Arc<ConcreteFormService>>;

/// Shared application state.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub form_service: Arc<ConcreteFormService>,
    pub api_keys: ApiKeyStore,
    pub config: Arc<AppConfig>,
    pub data_dir: PathBuf,
    /// Live HTTP chat sessions.
    pub sessions: Arc<SessionRegistry<ChatSession>>,
}

impl AppState {
    /// Resolve the data directory, load `config.toml`, open the database and
    /// wire the services. `backend` overrides the configured store.
    pub async fn init(backend: Option<StorageBackendKind>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let mut config = load_app_config(&data_dir).await;
        if let Some(backend) = backend {
            config.storage.backend = backend;
        }

        let db_pool = DatabasePool::new(&database_url(&data_dir)).await?;

        Ok(Self::from_parts(config, data_dir, db_pool))
    }

    /// Wire the state from an already opened pool.
    pub fn from_parts(config: AppConfig, data_dir: PathBuf, db_pool: DatabasePool) -> Self {
        let store = StoreBackend::new(config.storage.backend, &db_pool);
        let form_service = FormService::new(store.clone(), store, config.export.date_format);

        Self {
            form_service: Arc::new(form_service),
            api_keys: ApiKeyStore::new(db_pool),
            config: Arc::new(config),
            data_dir,
            sessions: Arc::new(SessionRegistry::default()),
        }
    }

    /// A conversation for `form` that counts the view and stores the lead.
    pub fn new_chat_session(&self, form: FormDefinition) -> ChatSession {
        ConversationEngine::new(
            form,
            self.form_service.clone(),
            self.config.chat.pacing,
            self.config.chat.locale,
        )
    }
}
