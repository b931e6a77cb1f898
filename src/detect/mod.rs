//! Span detectors and the detector registry.
//!
//! A detector is any span producer over the input text: an ML classifier
//! behind FFI, an HTTP inference client, or one of the built-in regex
//! detectors in this module. The pipeline treats them uniformly through the
//! [`Detector`] trait and a first-class registry of
//! `(detector, allowed-kind-set)` entries configured once at construction.

pub mod email;
pub mod phone;

pub use email::EmailDetector;
pub use phone::PhoneDetector;

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::merge::merge_adjacent;
use crate::types::{EntityKind, EntitySpan};

/// Error surfaced by a detector call.
///
/// Detector errors are never caught or retried by the pipeline; they abort
/// the whole `redact`/`replace` call (resilience is a caller concern).
#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    /// A built-in regex pattern failed to compile.
    #[error("detector pattern failed to compile: {name}")]
    Pattern {
        /// Name of the failing pattern.
        name: &'static str,
    },
    /// An external detector failed.
    #[error("detector failure: {0}")]
    Failed(String),
}

impl DetectorError {
    /// Create a failure from any error type, for external detector impls.
    pub fn from_source<E: std::error::Error>(e: E) -> Self {
        Self::Failed(e.to_string())
    }
}

/// A span producer over input text.
///
/// Returned spans must be entity-level (sub-word pieces aggregated by the
/// detector itself where applicable), in left-to-right emission order, with
/// `text` equal to `text[start..end]` at byte offsets `start..end`.
pub trait Detector {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Detect candidate spans in `text`.
    fn detect(&self, text: &str) -> Result<Vec<EntitySpan>, DetectorError>;
}

/// One registered detector with the kinds it is trusted to emit.
struct RegistryEntry {
    detector: Box<dyn Detector>,
    filter: HashSet<EntityKind>,
}

/// Ordered registry of `(detector, filter)` pairs.
///
/// Configured once at construction and iterated read-only per pipeline call.
/// Registration order has no effect on which ranges survive resolution; it
/// only breaks ties between positionally identical spans.
#[derive(Default)]
pub struct DetectorRegistry {
    entries: Vec<RegistryEntry>,
}

impl DetectorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a detector with the set of kinds it may emit.
    ///
    /// Spans of any other kind are discarded after fragment merging.
    pub fn register(
        &mut self,
        detector: impl Detector + 'static,
        filter: impl IntoIterator<Item = EntityKind>,
    ) {
        self.entries.push(RegistryEntry {
            detector: Box::new(detector),
            filter: filter.into_iter().collect(),
        });
    }

    /// Number of registered detectors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no detector is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every detector over `text` and accumulate candidate spans.
    ///
    /// Per entry: detect, merge adjacent fragments, apply the kind filter,
    /// validate the span invariant, append. The accumulator starts empty on
    /// every call; detectors are mutually independent and run sequentially.
    pub fn scan(&self, text: &str) -> Result<Vec<EntitySpan>, DetectorError> {
        let mut candidates: Vec<EntitySpan> = Vec::new();

        for entry in &self.entries {
            let raw = entry.detector.detect(text)?;
            let raw_count = raw.len();

            let merged = merge_adjacent(raw);
            let mut spans: Vec<EntitySpan> = merged
                .into_iter()
                .filter(|s| entry.filter.contains(&s.kind))
                .collect();
            spans.retain(|s| validate_span(text, s, entry.detector.name()));

            debug!(
                detector = entry.detector.name(),
                raw = raw_count,
                kept = spans.len(),
                "detector scan"
            );
            candidates.append(&mut spans);
        }

        Ok(candidates)
    }
}

/// Enforce the span invariant at the trust boundary: offsets in range, on
/// char boundaries, and `text` equal to the slice they address. Violating
/// spans are dropped with a warning rather than corrupting substitution.
fn validate_span(text: &str, span: &EntitySpan, detector: &str) -> bool {
    let well_formed = span.start <= span.end
        && span.end <= text.len()
        && text.is_char_boundary(span.start)
        && text.is_char_boundary(span.end)
        && text[span.start..span.end] == span.text;
    if !well_formed {
        warn!(
            detector,
            kind = %span.kind,
            start = span.start,
            end = span.end,
            "dropping span that does not match its offsets"
        );
    }
    well_formed
}
