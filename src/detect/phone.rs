//! French phone-number detector.

use regex_lite::Regex;
use std::sync::OnceLock;

use super::{Detector, DetectorError};
use crate::types::{EntityKind, EntitySpan};

/// National `0X XX XX XX XX` and international `+33` / `0033` forms, with
/// optional space/dot/dash separators and an optional `(0)` after the
/// country code.
const PHONE_PATTERN: &str =
    r"(?:(?:\+|00)33[ .-]?(?:\(0\)[ .-]?)?|0)[1-9](?:[ .-]?\d{2}){4}\b";

fn phone_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PHONE_PATTERN).ok()).as_ref()
}

/// Pattern-based detector for French telephone numbers.
///
/// A peer to the ML classifiers: it produces [`EntityKind::Phone`] spans
/// with confidence `1.0`. Offsets are bound to the regex match's own span,
/// so repeated occurrences of the same number each get their own position.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhoneDetector;

impl PhoneDetector {
    /// Create a phone detector.
    pub fn new() -> Self {
        Self
    }
}

impl Detector for PhoneDetector {
    fn name(&self) -> &str {
        "phone"
    }

    fn detect(&self, text: &str) -> Result<Vec<EntitySpan>, DetectorError> {
        let re = phone_regex().ok_or(DetectorError::Pattern { name: "phone" })?;
        Ok(re
            .find_iter(text)
            .map(|m| EntitySpan::new(EntityKind::Phone, 1.0, m.as_str(), m.start(), m.end()))
            .collect())
    }
}
