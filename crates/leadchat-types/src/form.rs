use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Placeholder in `email_label` replaced with the visitor's name.
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Default copy used by the form editor when a field is left out.
pub const DEFAULT_WELCOME_MESSAGE: &str = "Hi! 👋 I have something great for you!";
pub const DEFAULT_NAME_LABEL: &str = "First, what's your name?";
pub const DEFAULT_EMAIL_LABEL: &str = "Great, {name}! What's your best email?";
pub const DEFAULT_THANK_YOU_MESSAGE: &str = "Perfect! Your material is ready 🎉";

/// Unique identifier for a form, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FormId(pub Uuid);

impl FormId {
    /// Create a new FormId using UUID v7 (time-sortable, guaranteed ordering).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create a FormId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for FormId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FormId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// How a lead magnet is delivered once the conversation completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadMagnetKind {
    /// A downloadable file.
    File,
    /// An external page.
    #[default]
    Link,
}

impl fmt::Display for LeadMagnetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeadMagnetKind::File => write!(f, "file"),
            LeadMagnetKind::Link => write!(f, "link"),
        }
    }
}

impl FromStr for LeadMagnetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(LeadMagnetKind::File),
            "link" => Ok(LeadMagnetKind::Link),
            other => Err(format!("invalid lead magnet kind: '{other}'")),
        }
    }
}

/// The incentive offered in exchange for contact details.
///
/// Owned by exactly one form and shares its lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadMagnet {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub kind: LeadMagnetKind,
    pub url: String,
    pub cover_image: Option<String>,
}

/// A scripted conversational form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    pub id: FormId,
    pub title: String,
    /// URL-safe slug derived from the title ("Marketing 101" -> "marketing-101").
    pub slug: String,
    pub welcome_message: String,
    pub name_label: String,
    /// Prompt for the email step. May contain `{name}`.
    pub email_label: String,
    /// Optional extra question asked after the email.
    pub custom_question: Option<String>,
    pub thank_you_message: String,
    pub lead_magnet: LeadMagnet,
    /// Only published forms are reachable through the public slug.
    pub published: bool,
    pub view_count: i64,
    pub conversion_count: i64,
    pub created_at: DateTime<Utc>,
}

impl FormDefinition {
    /// Whether the conversation includes the custom question step.
    pub fn has_custom_question(&self) -> bool {
        self.custom_question
            .as_deref()
            .is_some_and(|q| !q.trim().is_empty())
    }

    /// Email prompt personalised with the captured name.
    pub fn email_prompt_for(&self, name: &str) -> String {
        render_email_prompt(&self.email_label, name)
    }

    /// Conversion percentage shown on the dashboard.
    pub fn conversion_rate(&self) -> u32 {
        conversion_rate(self.view_count, self.conversion_count)
    }
}

/// Lead magnet fields supplied by the form editor.
///
/// Replaces the stored magnet wholesale on update (the magnet id is kept).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeadMagnetInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub kind: Option<LeadMagnetKind>,
    pub url: String,
    #[serde(default)]
    pub cover_image: Option<String>,
}

impl LeadMagnetInput {
    /// Materialize into a stored magnet with the given id.
    pub fn into_magnet(self, id: Uuid) -> LeadMagnet {
        LeadMagnet {
            id,
            title: self.title.trim().to_string(),
            description: self.description.unwrap_or_default(),
            kind: self.kind.unwrap_or_default(),
            url: self.url.trim().to_string(),
            cover_image: self.cover_image.filter(|c| !c.trim().is_empty()),
        }
    }
}

/// Request to create a new form. Only `title` and the lead magnet's title
/// and url are required -- the scripted copy gets sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateFormRequest {
    pub title: String,
    #[serde(default)]
    pub welcome_message: Option<String>,
    #[serde(default)]
    pub name_label: Option<String>,
    #[serde(default)]
    pub email_label: Option<String>,
    #[serde(default)]
    pub custom_question: Option<String>,
    #[serde(default)]
    pub thank_you_message: Option<String>,
    pub lead_magnet: LeadMagnetInput,
    #[serde(default)]
    pub published: bool,
}

/// Partial update for a form. `None` leaves the field untouched.
///
/// `custom_question: Some("")` removes the custom question.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateFormRequest {
    pub title: Option<String>,
    pub welcome_message: Option<String>,
    pub name_label: Option<String>,
    pub email_label: Option<String>,
    pub custom_question: Option<String>,
    pub thank_you_message: Option<String>,
    pub lead_magnet: Option<LeadMagnetInput>,
    pub published: Option<bool>,
}

/// Per-form counters for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormStats {
    pub form_id: FormId,
    pub title: String,
    pub slug: String,
    pub published: bool,
    pub view_count: i64,
    pub conversion_count: i64,
    /// Rounded percentage, 0 when the form has no views.
    pub conversion_rate: u32,
}

impl From<&FormDefinition> for FormStats {
    fn from(form: &FormDefinition) -> Self {
        Self {
            form_id: form.id.clone(),
            title: form.title.clone(),
            slug: form.slug.clone(),
            published: form.published,
            view_count: form.view_count,
            conversion_count: form.conversion_count,
            conversion_rate: form.conversion_rate(),
        }
    }
}

/// Aggregate dashboard numbers across all forms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_forms: usize,
    pub published_forms: usize,
    pub total_views: i64,
    pub total_conversions: i64,
    pub forms: Vec<FormStats>,
}

impl DashboardStats {
    /// Build dashboard totals from the current set of forms.
    pub fn from_forms(forms: &[FormDefinition]) -> Self {
        Self {
            total_forms: forms.len(),
            published_forms: forms.iter().filter(|f| f.published).count(),
            total_views: forms.iter().map(|f| f.view_count).sum(),
            total_conversions: forms.iter().map(|f| f.conversion_count).sum(),
            forms: forms.iter().map(FormStats::from).collect(),
        }
    }
}

/// `round(conversions / views * 100)`, or 0 when there are no views.
pub fn conversion_rate(view_count: i64, conversion_count: i64) -> u32 {
    if view_count <= 0 {
        return 0;
    }
    let rate = (conversion_count as f64 / view_count as f64) * 100.0;
    rate.round().max(0.0) as u32
}

/// Replace the first `{name}` placeholder in an email prompt.
///
/// # Examples
///
/// ```
/// use leadchat_types::form::render_email_prompt;
///
/// assert_eq!(render_email_prompt("Hi {name}!", "Ana"), "Hi Ana!");
/// assert_eq!(render_email_prompt("Your email?", "Ana"), "Your email?");
/// ```
pub fn render_email_prompt(label: &str, name: &str) -> String {
    label.replacen(NAME_PLACEHOLDER, name, 1)
}

/// Generate a URL-safe slug from a form title.
///
/// Rules:
/// - Lowercase
/// - Latin diacritics folded to their base letter ("Ação" -> "acao")
/// - Whitespace and hyphens become a single hyphen
/// - Every other character that is not ASCII alphanumeric is dropped
///   ("v2.0" -> "v20")
/// - Leading/trailing hyphens trimmed
///
/// # Examples
///
/// ```
/// use leadchat_types::form::slugify;
///
/// assert_eq!(slugify("Marketing Digital Essencial"), "marketing-digital-essencial");
/// assert_eq!(slugify("Guia de Ação 2024!"), "guia-de-acao-2024");
/// assert_eq!(slugify("---hello---world---"), "hello-world");
/// assert_eq!(slugify("Release v2.0"), "release-v20");
/// ```
pub fn slugify(title: &str) -> String {
    let mut result = String::with_capacity(title.len());
    let mut prev_was_hyphen = true; // treat start as hyphen to trim leading

    for c in title.to_lowercase().chars().map(fold_diacritic) {
        if c.is_ascii_alphanumeric() {
            result.push(c);
            prev_was_hyphen = false;
        } else if (c.is_whitespace() || c == '-') && !prev_was_hyphen {
            result.push('-');
            prev_was_hyphen = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}

fn fold_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_form() -> FormDefinition {
        FormDefinition {
            id: FormId::new(),
            title: "Landing Page Template".to_string(),
            slug: "landing-page-template".to_string(),
            welcome_message: "Hello!".to_string(),
            name_label: "Name?".to_string(),
            email_label: "Email {name}?".to_string(),
            custom_question: None,
            thank_you_message: "Thanks".to_string(),
            lead_magnet: LeadMagnetInput {
                title: "Figma template".to_string(),
                url: "https://example.com/template".to_string(),
                ..Default::default()
            }
            .into_magnet(Uuid::now_v7()),
            published: true,
            view_count: 0,
            conversion_count: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Template de Landing Page"), "template-de-landing-page");
    }

    #[test]
    fn test_slugify_accents() {
        assert_eq!(slugify("Formulário Conversão"), "formulario-conversao");
    }

    #[test]
    fn test_slugify_drops_symbols_and_emoji() {
        assert_eq!(slugify("  Free  eBook 🚀 v2.0 "), "free-ebook-v20");
        assert_eq!(slugify("Q&A: sales_ops"), "qa-salesops");
    }

    #[test]
    fn test_magnet_kind_defaults_to_link() {
        assert_eq!(LeadMagnetKind::default(), LeadMagnetKind::Link);
        let magnet = LeadMagnetInput {
            title: "Guide".to_string(),
            url: "https://example.com".to_string(),
            ..Default::default()
        }
        .into_magnet(Uuid::now_v7());
        assert_eq!(magnet.kind, LeadMagnetKind::Link);
    }

    #[test]
    fn test_slugify_only_symbols_is_empty() {
        assert_eq!(slugify("!!! ???"), "");
    }

    #[test]
    fn test_email_prompt_replaces_first_placeholder_only() {
        assert_eq!(render_email_prompt("Hi {name}!", "Ana"), "Hi Ana!");
        assert_eq!(
            render_email_prompt("{name}, {name}", "Bob"),
            "Bob, {name}"
        );
    }

    #[test]
    fn test_conversion_rate() {
        assert_eq!(conversion_rate(0, 0), 0);
        assert_eq!(conversion_rate(0, 5), 0);
        assert_eq!(conversion_rate(234, 48), 21);
        assert_eq!(conversion_rate(12, 3), 25);
        assert_eq!(conversion_rate(8, 1), 13); // 12.5 rounds up
        assert_eq!(conversion_rate(3, 2), 67);
    }

    #[test]
    fn test_has_custom_question_ignores_blank() {
        let mut form = sample_form();
        assert!(!form.has_custom_question());
        form.custom_question = Some("   ".to_string());
        assert!(!form.has_custom_question());
        form.custom_question = Some("What do you do?".to_string());
        assert!(form.has_custom_question());
    }

    #[test]
    fn test_lead_magnet_input_defaults() {
        let magnet = LeadMagnetInput {
            title: " Guide ".to_string(),
            url: "https://example.com".to_string(),
            cover_image: Some(String::new()),
            ..Default::default()
        }
        .into_magnet(Uuid::now_v7());
        assert_eq!(magnet.title, "Guide");
        assert_eq!(magnet.kind, LeadMagnetKind::Link);
        assert!(magnet.description.is_empty());
        assert!(magnet.cover_image.is_none());
    }

    #[test]
    fn test_lead_magnet_kind_roundtrip() {
        for kind in [LeadMagnetKind::File, LeadMagnetKind::Link] {
            let parsed: LeadMagnetKind = kind.to_string().parse().unwrap();
            assert_eq!(kind, parsed);
        }
        assert!("pdf".parse::<LeadMagnetKind>().is_err());
    }

    #[test]
    fn test_dashboard_stats_totals() {
        let mut a = sample_form();
        a.view_count = 10;
        a.conversion_count = 4;
        let mut b = sample_form();
        b.published = false;
        b.view_count = 5;
        b.conversion_count = 1;

        let stats = DashboardStats::from_forms(&[a, b]);
        assert_eq!(stats.total_forms, 2);
        assert_eq!(stats.published_forms, 1);
        assert_eq!(stats.total_views, 15);
        assert_eq!(stats.total_conversions, 5);
        assert_eq!(stats.forms[0].conversion_rate, 40);
        assert_eq!(stats.forms[1].conversion_rate, 20);
    }

    #[test]
    fn test_form_id_display() {
        let id = FormId::new();
        let parsed: FormId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}
