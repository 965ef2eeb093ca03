//! The port a conversation uses to talk to storage.
//!
//! A conversation only needs two things from the outside world: counting
//! that it was viewed, and persisting the finished lead. `FormService`
//! provides both; `PreviewCapture` provides neither, for editor previews.

use std::future::Future;
use std::sync::Arc;

use leadchat_types::error::LeadError;
use leadchat_types::form::FormId;
use leadchat_types::lead::{CreateLeadRequest, Lead, is_valid_email};
use tracing::{info, warn};

use crate::repository::form::FormRepository;
use crate::repository::lead::LeadRepository;
use crate::service::form::FormService;

/// Records views and leads on behalf of a conversation.
pub trait LeadCapture: Send + Sync {
    /// Count one view of the form. Failures are logged, never surfaced.
    fn record_view(&self, form_id: &FormId) -> impl Future<Output = ()> + Send;

    /// Persist a finished lead.
    fn submit_lead(
        &self,
        request: CreateLeadRequest,
    ) -> impl Future<Output = Result<Lead, LeadError>> + Send;
}

impl<F: FormRepository, L: LeadRepository> LeadCapture for FormService<F, L> {
    async fn record_view(&self, form_id: &FormId) {
        if let Err(e) = self.increment_form_view(form_id).await {
            warn!(form_id = %form_id, error = %e, "failed to record form view");
        }
    }

    async fn submit_lead(&self, request: CreateLeadRequest) -> Result<Lead, LeadError> {
        self.create_lead(request).await
    }
}

impl<T: LeadCapture> LeadCapture for Arc<T> {
    fn record_view(&self, form_id: &FormId) -> impl Future<Output = ()> + Send {
        (**self).record_view(form_id)
    }

    fn submit_lead(
        &self,
        request: CreateLeadRequest,
    ) -> impl Future<Output = Result<Lead, LeadError>> + Send {
        (**self).submit_lead(request)
    }
}

/// Capture used when previewing a form in the editor: nothing is counted
/// or stored, the lead is only logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreviewCapture;

impl LeadCapture for PreviewCapture {
    async fn record_view(&self, _form_id: &FormId) {}

    async fn submit_lead(&self, request: CreateLeadRequest) -> Result<Lead, LeadError> {
        if !is_valid_email(&request.email) {
            return Err(LeadError::InvalidEmail(request.email));
        }
        let lead = request.into_lead();
        info!(form_id = %lead.form_id, name = %lead.name, email = %lead.email, "preview lead captured (not stored)");
        Ok(lead)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_preview_capture_does_not_need_a_form() {
        let lead = PreviewCapture
            .submit_lead(CreateLeadRequest {
                form_id: FormId::new(),
                name: "Ana".to_string(),
                email: "ana@x.com".to_string(),
                custom_answer: Some("Design".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(lead.custom_answer.as_deref(), Some("Design"));
    }

    #[tokio::test]
    async fn test_arc_capture_delegates() {
        let capture = Arc::new(PreviewCapture);
        let err = capture
            .submit_lead(CreateLeadRequest {
                form_id: FormId::new(),
                name: "Ana".to_string(),
                email: "nope".to_string(),
                custom_answer: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LeadError::InvalidEmail(_)));
    }
}
