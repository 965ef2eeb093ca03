//! In-memory store backed by `DashMap`.
//!
//! Used for demos and tests. Insertion order is recovered from the
//! time-sortable v7 ids. Counter bumps happen under the per-entry lock, and
//! a writer mutex serializes the published-slug check with the write that
//! depends on it.

use std::sync::Arc;

use dashmap::DashMap;
use leadchat_core::repository::form::FormRepository;
use leadchat_core::repository::lead::LeadRepository;
use leadchat_types::error::RepositoryError;
use leadchat_types::form::{FormDefinition, FormId};
use leadchat_types::lead::Lead;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Process-local implementation of `FormRepository` and `LeadRepository`.
///
/// Clones share the same data.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    forms: Arc<DashMap<FormId, FormDefinition>>,
    leads: Arc<DashMap<Uuid, Lead>>,
    writer: Arc<Mutex<()>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether another published form already uses `slug`.
    fn published_slug_taken(&self, slug: &str, own_id: &FormId) -> bool {
        self.forms
            .iter()
            .any(|entry| entry.published && entry.slug == slug && entry.key() != own_id)
    }
}

impl FormRepository for InMemoryStore {
    async fn create(&self, form: &FormDefinition) -> Result<FormDefinition, RepositoryError> {
        let _guard = self.writer.lock().await;

        if self.forms.contains_key(&form.id) {
            return Err(RepositoryError::Conflict(format!("form {} already exists", form.id)));
        }
        if form.published && self.published_slug_taken(&form.slug, &form.id) {
            return Err(RepositoryError::Conflict(form.slug.clone()));
        }

        self.forms.insert(form.id.clone(), form.clone());
        Ok(form.clone())
    }

    async fn get_by_id(&self, id: &FormId) -> Result<Option<FormDefinition>, RepositoryError> {
        Ok(self.forms.get(id).map(|entry| entry.value().clone()))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<FormDefinition>, RepositoryError> {
        let mut matches: Vec<FormDefinition> = self
            .forms
            .iter()
            .filter(|entry| entry.slug == slug)
            .map(|entry| entry.value().clone())
            .collect();
        matches.sort_by(|a, b| b.published.cmp(&a.published).then_with(|| a.id.cmp(&b.id)));
        Ok(matches.into_iter().next())
    }

    async fn list(&self) -> Result<Vec<FormDefinition>, RepositoryError> {
        let mut forms: Vec<FormDefinition> =
            self.forms.iter().map(|entry| entry.value().clone()).collect();
        forms.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(forms)
    }

    async fn update(&self, form: &FormDefinition) -> Result<FormDefinition, RepositoryError> {
        let _guard = self.writer.lock().await;

        // Checked before taking the entry lock: iterating while holding it deadlocks.
        if form.published && self.published_slug_taken(&form.slug, &form.id) {
            return Err(RepositoryError::Conflict(form.slug.clone()));
        }

        let mut stored = self
            .forms
            .get_mut(&form.id)
            .ok_or(RepositoryError::NotFound)?;
        let updated = FormDefinition {
            view_count: stored.view_count,
            conversion_count: stored.conversion_count,
            created_at: stored.created_at,
            ..form.clone()
        };
        *stored = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: &FormId) -> Result<bool, RepositoryError> {
        let _guard = self.writer.lock().await;

        if self.forms.remove(id).is_none() {
            return Ok(false);
        }
        self.leads.retain(|_, lead| &lead.form_id != id);
        Ok(true)
    }

    async fn increment_views(&self, id: &FormId) -> Result<(), RepositoryError> {
        let mut form = self.forms.get_mut(id).ok_or(RepositoryError::NotFound)?;
        form.view_count += 1;
        debug!(form_id = %id, views = form.view_count, "view counted");
        Ok(())
    }
}

impl LeadRepository for InMemoryStore {
    async fn create(&self, lead: &Lead) -> Result<Lead, RepositoryError> {
        // Holding the form entry keeps a concurrent delete from orphaning the lead.
        let mut form = self
            .forms
            .get_mut(&lead.form_id)
            .ok_or(RepositoryError::NotFound)?;
        form.conversion_count += 1;
        self.leads.insert(lead.id, lead.clone());
        Ok(lead.clone())
    }

    async fn list(&self, form_id: Option<&FormId>) -> Result<Vec<Lead>, RepositoryError> {
        let mut leads: Vec<Lead> = self
            .leads
            .iter()
            .filter(|entry| form_id.is_none_or(|id| &entry.form_id == id))
            .map(|entry| entry.value().clone())
            .collect();
        leads.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(leads)
    }
}
