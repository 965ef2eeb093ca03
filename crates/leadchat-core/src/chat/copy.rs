//! Localized copy the engine emits on its own behalf.
//!
//! Form owners write the scripted messages; these are the few strings the
//! engine adds itself: the email validation hint, the generic retry message
//! and the label of the lead-magnet access action.

use leadchat_types::config::Locale;
use leadchat_types::form::LeadMagnetKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatCopy {
    pub invalid_email: &'static str,
    pub submission_failed: &'static str,
    pub download_action: &'static str,
    pub open_action: &'static str,
}

impl ChatCopy {
    pub fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::English => Self {
                invalid_email: "Oops! Please enter a valid email 📧",
                submission_failed: "Oops! Something went wrong. Please try again in a few seconds.",
                download_action: "Download material",
                open_action: "Open material",
            },
            Locale::BrazilianPortuguese => Self {
                invalid_email: "Ops! Por favor, digite um email válido 📧",
                submission_failed: "Ops! Algo deu errado. Tente novamente em alguns segundos.",
                download_action: "Baixar Material",
                open_action: "Acessar Material",
            },
        }
    }

    /// Action label for the lead magnet shown on completion.
    pub fn action_for(&self, kind: LeadMagnetKind) -> &'static str {
        match kind {
            LeadMagnetKind::File => self.download_action,
            LeadMagnetKind::Link => self.open_action,
        }
    }
}

impl Default for ChatCopy {
    fn default() -> Self {
        Self::for_locale(Locale::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_labels() {
        let copy = ChatCopy::for_locale(Locale::English);
        assert_eq!(copy.action_for(LeadMagnetKind::File), "Download material");
        assert_eq!(copy.action_for(LeadMagnetKind::Link), "Open material");
    }

    #[test]
    fn test_locales_differ() {
        assert_ne!(
            ChatCopy::for_locale(Locale::English).invalid_email,
            ChatCopy::for_locale(Locale::BrazilianPortuguese).invalid_email
        );
    }
}
