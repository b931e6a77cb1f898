//! Email address detector.

use regex_lite::Regex;
use std::sync::OnceLock;

use super::{Detector, DetectorError};
use crate::types::{EntityKind, EntitySpan};

/// `local-part@domain` with the standard permitted local-part characters and
/// one-or-more dot-separated domain labels.
const EMAIL_PATTERN: &str = r"[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)+";

fn email_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMAIL_PATTERN).ok()).as_ref()
}

/// Pattern-based detector for email addresses.
///
/// Produces [`EntityKind::Email`] spans with confidence `1.0`, offsets bound
/// to each match's own position.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailDetector;

impl EmailDetector {
    /// Create an email detector.
    pub fn new() -> Self {
        Self
    }
}

impl Detector for EmailDetector {
    fn name(&self) -> &str {
        "email"
    }

    fn detect(&self, text: &str) -> Result<Vec<EntitySpan>, DetectorError> {
        let re = email_regex().ok_or(DetectorError::Pattern { name: "email" })?;
        Ok(re
            .find_iter(text)
            .map(|m| EntitySpan::new(EntityKind::Email, 1.0, m.as_str(), m.start(), m.end()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(text: &str) -> Vec<EntitySpan> {
        EmailDetector::new().detect(text).unwrap()
    }

    #[test]
    fn test_simple_address() {
        let text = "Contact : jean.dupont@exemple.fr svp.";
        let spans = detect(text);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "jean.dupont@exemple.fr");
        assert_eq!(spans[0].kind, EntityKind::Email);
        assert_eq!(&text[spans[0].start..spans[0].end], spans[0].text);
    }

    #[test]
    fn test_local_part_character_set() {
        let spans = detect("envoyer a prenom_nom+tag%x@mail-serveur.example.org");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "prenom_nom+tag%x@mail-serveur.example.org");
    }

    #[test]
    fn test_repeated_address_gets_distinct_offsets() {
        let text = "a@b.fr puis encore a@b.fr";
        let spans = detect(text);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].start, 0);
        assert_eq!(spans[1].start, 19);
    }

    #[test]
    fn test_requires_domain_label() {
        assert!(detect("pas un mail: jean@").is_empty());
        assert!(detect("ni ceci: jean@localhost").is_empty());
    }
}
