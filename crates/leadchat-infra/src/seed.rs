//! Demo data for a fresh data directory.
//!
//! Two forms (one live with a custom question, one draft) and three leads
//! for the live one. Writes go straight to the repositories so the demo
//! counters and dates are kept as given.

use chrono::{DateTime, TimeZone, Utc};
use leadchat_core::repository::form::FormRepository;
use leadchat_core::repository::lead::LeadRepository;
use leadchat_types::error::RepositoryError;
use leadchat_types::form::{FormDefinition, FormId, LeadMagnet, LeadMagnetKind};
use leadchat_types::lead::Lead;
use tracing::info;
use uuid::Uuid;

/// What a seed run added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub forms_created: usize,
    pub forms_skipped: usize,
    pub leads_created: usize,
}

struct DemoLead {
    name: &'static str,
    email: &'static str,
    custom_answer: &'static str,
    created_at: (u32, u32, u32),
}

const DEMO_LEADS: [DemoLead; 3] = [
    DemoLead {
        name: "Ana Silva",
        email: "ana.silva@email.com",
        custom_answer: "Marketing",
        created_at: (20, 9, 15),
    },
    DemoLead {
        name: "João Santos",
        email: "joao@empresa.com",
        custom_answer: "Vendas",
        created_at: (19, 16, 30),
    },
    DemoLead {
        name: "Maria Costa",
        email: "maria.costa@gmail.com",
        custom_answer: "Design",
        created_at: (18, 11, 45),
    },
];

fn january_2024(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, minute, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

fn demo_forms() -> Vec<FormDefinition> {
    vec![
        FormDefinition {
            id: FormId::new(),
            title: "Marketing Digital Essencial".to_string(),
            slug: "marketing-digital-essencial".to_string(),
            welcome_message: "Oi! 👋 Eu tenho um material incrível sobre Marketing Digital para você!"
                .to_string(),
            name_label: "Primeiro, qual é o seu nome?".to_string(),
            email_label: "Ótimo, {name}! Qual seu melhor email?".to_string(),
            custom_question: Some("Em que área você trabalha?".to_string()),
            thank_you_message: "Perfeito! Seu material está pronto 🎉".to_string(),
            lead_magnet: LeadMagnet {
                id: Uuid::now_v7(),
                title: "Guia Completo de Marketing Digital 2024".to_string(),
                description: "Um guia prático com as melhores estratégias de marketing digital"
                    .to_string(),
                kind: LeadMagnetKind::File,
                url: "https://example.com/guia-marketing.pdf".to_string(),
                cover_image: Some(
                    "https://images.unsplash.com/photo-1460925895917-afdab827c52f?w=400&h=300&fit=crop"
                        .to_string(),
                ),
            },
            published: true,
            view_count: 234,
            // The three demo leads below bring this to 48.
            conversion_count: 45,
            created_at: january_2024(15, 10, 30),
        },
        FormDefinition {
            id: FormId::new(),
            title: "Template de Landing Page".to_string(),
            slug: "template-landing-page".to_string(),
            welcome_message: "Olá! 🚀 Tenho um template incrível de landing page para você!"
                .to_string(),
            name_label: "Como posso te chamar?".to_string(),
            email_label: "Perfeito, {name}! Onde posso enviar o template?".to_string(),
            custom_question: None,
            thank_you_message: "Maravilha! Seu template está a caminho 📧".to_string(),
            lead_magnet: LeadMagnet {
                id: Uuid::now_v7(),
                title: "Template Figma - Landing Page Conversiva".to_string(),
                description: "Template profissional no Figma com 5 variações".to_string(),
                kind: LeadMagnetKind::Link,
                url: "https://figma.com/template-landing".to_string(),
                cover_image: Some(
                    "https://images.unsplash.com/photo-1551650975-87deedd944c3?w=400&h=300&fit=crop"
                        .to_string(),
                ),
            },
            published: false,
            view_count: 12,
            conversion_count: 3,
            created_at: january_2024(10, 14, 20),
        },
    ]
}

/// Insert the demo forms and leads. Forms whose slug is already in use are
/// skipped along with their leads, so running twice adds nothing.
pub async fn seed_demo_data<F, L>(forms: &F, leads: &L) -> Result<SeedSummary, RepositoryError>
where
    F: FormRepository,
    L: LeadRepository,
{
    let mut summary = SeedSummary::default();

    for (index, form) in demo_forms().into_iter().enumerate() {
        if forms.get_by_slug(&form.slug).await?.is_some() {
            summary.forms_skipped += 1;
            continue;
        }

        let form = forms.create(&form).await?;
        summary.forms_created += 1;

        if index == 0 {
            for demo in &DEMO_LEADS {
                let (day, hour, minute) = demo.created_at;
                leads
                    .create(&Lead {
                        id: Uuid::now_v7(),
                        form_id: form.id.clone(),
                        name: demo.name.to_string(),
                        email: demo.email.to_string(),
                        custom_answer: Some(demo.custom_answer.to_string()),
                        created_at: january_2024(day, hour, minute),
                    })
                    .await?;
                summary.leads_created += 1;
            }
        }
    }

    info!(
        forms = summary.forms_created,
        skipped = summary.forms_skipped,
        leads = summary.leads_created,
        "demo data seeded"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use crate::sqlite::{SqliteStore, test_pool};

    #[tokio::test]
    async fn test_seed_memory_store() {
        let store = InMemoryStore::new();
        let summary = seed_demo_data(&store, &store).await.unwrap();
        assert_eq!(
            summary,
            SeedSummary {
                forms_created: 2,
                forms_skipped: 0,
                leads_created: 3
            }
        );

        let live = store
            .get_by_slug("marketing-digital-essencial")
            .await
            .unwrap()
            .unwrap();
        assert!(live.published);
        assert_eq!(live.conversion_count, 48);
        assert_eq!(live.conversion_rate(), 21);
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let store = SqliteStore::new(test_pool().await);
        seed_demo_data(&store, &store).await.unwrap();
        let again = seed_demo_data(&store, &store).await.unwrap();
        assert_eq!(again.forms_created, 0);
        assert_eq!(again.forms_skipped, 2);
        assert_eq!(LeadRepository::list(&store, None).await.unwrap().len(), 3);
    }
}
