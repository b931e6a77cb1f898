//! Substitution log types.
//!
//! Every `redact`/`replace` call clears its anonymizer's log and repopulates
//! it during that call. The log is the only state that survives the call; it
//! is what makes the transformation reversible. One log is valid for exactly
//! one produced output.

use serde::{Deserialize, Serialize};

use super::span::EntityKind;

/// One redaction: a span masked with the fixed placeholder marker.
///
/// `start`/`end` are the span's offsets in the original snapshot, not in the
/// redacted output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionRecord {
    /// Entity category of the masked span.
    pub kind: EntityKind,
    /// The original matched text.
    pub original: String,
    /// Byte offset of the span in the original snapshot.
    pub start: usize,
    /// Byte offset one past the span in the original snapshot.
    pub end: usize,
}

/// One replacement: a span substituted with a synthetic or configured value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementRecord {
    /// Entity category of the replaced span.
    pub kind: EntityKind,
    /// The original matched text.
    pub original: String,
    /// Byte offset of the span in the original snapshot.
    pub start: usize,
    /// Byte offset one past the span in the original snapshot.
    pub end: usize,
    /// The value the span was replaced with.
    pub replacement: String,
}

/// The replayable log produced by the last top-level call.
///
/// Redaction logs are kept sorted by `start` ascending; replacement logs keep
/// processing order (configured kind order). Deanonymization relies on this
/// asymmetry, see [`crate::Anonymizer::deanonymize`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum SubstitutionLog {
    /// No `redact`/`replace` call has run yet (or the last run matched nothing
    /// and was reset).
    #[default]
    Empty,
    /// Log of a `redact` call.
    Redactions(Vec<RedactionRecord>),
    /// Log of a `replace` call.
    Replacements(Vec<ReplacementRecord>),
}

impl SubstitutionLog {
    /// Number of substitutions recorded.
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Redactions(records) => records.len(),
            Self::Replacements(records) => records.len(),
        }
    }

    /// Whether the log records no substitutions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
