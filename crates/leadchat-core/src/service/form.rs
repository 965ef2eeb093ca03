//! Form and lead management service.
//!
//! Orchestrates the form editor (create, update, publish, delete), the
//! public slug lookup, view/conversion counting, lead capture, the CSV
//! export and the dashboard numbers.

use leadchat_types::config::CsvDateFormat;
use leadchat_types::error::{FormError, LeadError, RepositoryError};
use leadchat_types::form::{
    CreateFormRequest, DEFAULT_EMAIL_LABEL, DEFAULT_NAME_LABEL, DEFAULT_THANK_YOU_MESSAGE,
    DEFAULT_WELCOME_MESSAGE, DashboardStats, FormDefinition, FormId, UpdateFormRequest, slugify,
};
use leadchat_types::lead::{CreateLeadRequest, Lead, is_valid_email};
use tracing::{debug, info};
use uuid::Uuid;

use crate::repository::form::FormRepository;
use crate::repository::lead::LeadRepository;
use crate::service::export::leads_to_csv;

/// Upper bound on `-2`, `-3`, ... suffixes tried when a slug is taken.
const MAX_SLUG_SUFFIX: u32 = 100;

/// Service orchestrating forms and their leads.
///
/// Generic over repository traits to maintain clean architecture --
/// leadchat-core never depends on leadchat-infra.
pub struct FormService<F: FormRepository, L: LeadRepository> {
    form_repo: F,
    lead_repo: L,
    date_format: CsvDateFormat,
}

impl<F: FormRepository, L: LeadRepository> FormService<F, L> {
    /// Create a new FormService.
    ///
    /// - `form_repo`: persistence for forms (deletes cascade to leads)
    /// - `lead_repo`: persistence for leads (creates bump conversions)
    /// - `date_format`: date layout used by the CSV export
    pub fn new(form_repo: F, lead_repo: L, date_format: CsvDateFormat) -> Self {
        Self {
            form_repo,
            lead_repo,
            date_format,
        }
    }

    /// Access the form repository.
    pub fn form_repo(&self) -> &F {
        &self.form_repo
    }

    /// Access the lead repository.
    pub fn lead_repo(&self) -> &L {
        &self.lead_repo
    }

    // --- Forms ---

    /// Create a new form from the editor fields.
    ///
    /// Validates the required fields, derives a unique slug from the title
    /// and starts both counters at zero.
    pub async fn create_form(&self, request: CreateFormRequest) -> Result<FormDefinition, FormError> {
        let title = request.title.trim().to_string();
        validate_title(&title)?;
        validate_magnet(&request.lead_magnet.title, &request.lead_magnet.url)?;

        let slug = self.ensure_unique_slug(&slugify(&title), None).await?;

        let form = FormDefinition {
            id: FormId::new(),
            title,
            slug,
            welcome_message: copy_or(request.welcome_message, DEFAULT_WELCOME_MESSAGE),
            name_label: copy_or(request.name_label, DEFAULT_NAME_LABEL),
            email_label: copy_or(request.email_label, DEFAULT_EMAIL_LABEL),
            custom_question: normalize_question(request.custom_question),
            thank_you_message: copy_or(request.thank_you_message, DEFAULT_THANK_YOU_MESSAGE),
            lead_magnet: request.lead_magnet.into_magnet(Uuid::now_v7()),
            published: request.published,
            view_count: 0,
            conversion_count: 0,
            created_at: chrono::Utc::now(),
        };

        let form = self.form_repo.create(&form).await.map_err(map_form_error)?;

        info!(form_id = %form.id, slug = %form.slug, published = form.published, "form created");
        Ok(form)
    }

    /// Get a form by ID.
    pub async fn get_form(&self, id: &FormId) -> Result<FormDefinition, FormError> {
        self.form_repo
            .get_by_id(id)
            .await
            .map_err(map_form_error)?
            .ok_or(FormError::NotFound)
    }

    /// Get a form by slug, published or not.
    pub async fn get_form_by_slug(&self, slug: &str) -> Result<FormDefinition, FormError> {
        self.form_repo
            .get_by_slug(slug)
            .await
            .map_err(map_form_error)?
            .ok_or(FormError::NotFound)
    }

    /// Resolve a form by slug first, then by ID.
    pub async fn resolve_form(&self, id_or_slug: &str) -> Result<FormDefinition, FormError> {
        match self.get_form_by_slug(id_or_slug).await {
            Ok(form) => Ok(form),
            Err(FormError::NotFound) => {
                let id = id_or_slug.parse().map_err(|_| FormError::NotFound)?;
                self.get_form(&id).await
            }
            Err(e) => Err(e),
        }
    }

    /// Look up a form for a visitor: unpublished forms are not available.
    pub async fn get_public_form(&self, slug: &str) -> Result<FormDefinition, FormError> {
        let form = self.get_form_by_slug(slug).await?;
        if !form.published {
            return Err(FormError::Unpublished);
        }
        Ok(form)
    }

    /// List all forms in insertion order.
    pub async fn list_forms(&self) -> Result<Vec<FormDefinition>, FormError> {
        self.form_repo.list().await.map_err(map_form_error)
    }

    /// Apply a partial update.
    ///
    /// Fields are replaced shallowly; a provided lead magnet replaces the
    /// stored one wholesale but keeps its id. Changing the title re-derives
    /// the slug.
    pub async fn update_form(
        &self,
        id: &FormId,
        request: UpdateFormRequest,
    ) -> Result<FormDefinition, FormError> {
        let mut form = self.get_form(id).await?;

        if let Some(title) = request.title {
            let title = title.trim().to_string();
            validate_title(&title)?;
            if title != form.title {
                form.slug = self.ensure_unique_slug(&slugify(&title), Some(id)).await?;
                form.title = title;
            }
        }
        if let Some(welcome) = request.welcome_message {
            form.welcome_message = welcome;
        }
        if let Some(name_label) = request.name_label {
            form.name_label = name_label;
        }
        if let Some(email_label) = request.email_label {
            form.email_label = email_label;
        }
        if let Some(question) = request.custom_question {
            form.custom_question = normalize_question(Some(question));
        }
        if let Some(thank_you) = request.thank_you_message {
            form.thank_you_message = thank_you;
        }
        if let Some(magnet) = request.lead_magnet {
            validate_magnet(&magnet.title, &magnet.url)?;
            form.lead_magnet = magnet.into_magnet(form.lead_magnet.id);
        }
        if let Some(published) = request.published {
            form.published = published;
        }

        let form = self.form_repo.update(&form).await.map_err(map_form_error)?;

        info!(form_id = %form.id, slug = %form.slug, published = form.published, "form updated");
        Ok(form)
    }

    /// Publish or unpublish a form.
    pub async fn set_published(&self, id: &FormId, published: bool) -> Result<FormDefinition, FormError> {
        self.update_form(
            id,
            UpdateFormRequest {
                published: Some(published),
                ..Default::default()
            },
        )
        .await
    }

    /// Delete a form and its leads. Deleting an unknown id is not an error;
    /// the return value tells whether anything was removed.
    pub async fn delete_form(&self, id: &FormId) -> Result<bool, FormError> {
        let removed = self.form_repo.delete(id).await.map_err(map_form_error)?;
        if removed {
            info!(form_id = %id, "form deleted with its leads");
        } else {
            debug!(form_id = %id, "delete requested for unknown form");
        }
        Ok(removed)
    }

    /// Count one view of a form.
    pub async fn increment_form_view(&self, id: &FormId) -> Result<(), FormError> {
        self.form_repo
            .increment_views(id)
            .await
            .map_err(map_form_error)?;
        debug!(form_id = %id, "form view recorded");
        Ok(())
    }

    /// Ensure a slug is unique by appending -2, -3, etc. if needed.
    ///
    /// `own_id` lets a form keep a slug it already holds.
    async fn ensure_unique_slug(
        &self,
        base_slug: &str,
        own_id: Option<&FormId>,
    ) -> Result<String, FormError> {
        if base_slug.is_empty() {
            return Err(FormError::Validation(
                "title must contain at least one letter or digit".to_string(),
            ));
        }

        let mut slug = base_slug.to_string();
        let mut counter = 2;

        loop {
            let existing = self
                .form_repo
                .get_by_slug(&slug)
                .await
                .map_err(map_form_error)?;

            match existing {
                None => return Ok(slug),
                Some(form) if Some(&form.id) == own_id => return Ok(slug),
                Some(_) => {}
            }

            slug = format!("{base_slug}-{counter}");
            counter += 1;

            if counter > MAX_SLUG_SUFFIX {
                return Err(FormError::SlugConflict(format!(
                    "could not generate unique slug from '{base_slug}'"
                )));
            }
        }
    }

    // --- Leads ---

    /// Store a lead for a form and count the conversion.
    ///
    /// The name must be non-blank and the email must look like an address.
    /// A custom answer is only kept when the form asks a custom question.
    pub async fn create_lead(&self, request: CreateLeadRequest) -> Result<Lead, LeadError> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(LeadError::Validation("name cannot be empty".to_string()));
        }
        let email = request.email.trim().to_string();
        if !is_valid_email(&email) {
            return Err(LeadError::InvalidEmail(email));
        }

        let form = self
            .form_repo
            .get_by_id(&request.form_id)
            .await
            .map_err(|e| LeadError::Storage(e.to_string()))?
            .ok_or(LeadError::FormNotFound)?;

        let custom_answer = if form.has_custom_question() {
            request
                .custom_answer
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
        } else {
            None
        };

        let lead = CreateLeadRequest {
            form_id: form.id,
            name,
            email,
            custom_answer,
        }
        .into_lead();

        let lead = self.lead_repo.create(&lead).await.map_err(|e| match e {
            RepositoryError::NotFound => LeadError::FormNotFound,
            other => LeadError::Storage(other.to_string()),
        })?;

        info!(form_id = %lead.form_id, lead_id = %lead.id, "lead captured");
        Ok(lead)
    }

    /// List leads, optionally for one form.
    pub async fn list_leads(&self, form_id: Option<&FormId>) -> Result<Vec<Lead>, LeadError> {
        self.lead_repo
            .list(form_id)
            .await
            .map_err(|e| LeadError::Storage(e.to_string()))
    }

    /// Render a form's leads as CSV.
    pub async fn export_leads_csv(&self, form_id: &FormId) -> Result<String, FormError> {
        let leads = self
            .lead_repo
            .list(Some(form_id))
            .await
            .map_err(map_form_error)?;
        Ok(leads_to_csv(&leads, self.date_format))
    }

    // --- Dashboard ---

    /// Totals and per-form conversion rates.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, FormError> {
        let forms = self.list_forms().await?;
        Ok(DashboardStats::from_forms(&forms))
    }
}

fn map_form_error(e: RepositoryError) -> FormError {
    match e {
        RepositoryError::NotFound => FormError::NotFound,
        RepositoryError::Conflict(msg) => FormError::SlugConflict(msg),
        other => FormError::Storage(other.to_string()),
    }
}

fn validate_title(title: &str) -> Result<(), FormError> {
    if title.is_empty() {
        return Err(FormError::Validation("title is required".to_string()));
    }
    Ok(())
}

fn validate_magnet(title: &str, url: &str) -> Result<(), FormError> {
    if title.trim().is_empty() || url.trim().is_empty() {
        return Err(FormError::Validation(
            "lead magnet title and url are required".to_string(),
        ));
    }
    Ok(())
}

fn copy_or(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn normalize_question(question: Option<String>) -> Option<String> {
    question
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
}
