//! # textanon
//!
//! Reversible PII text anonymization with deterministic span resolution.
//!
//! The crate answers one question:
//!
//! > Given text and a set of independent entity detectors, how do their
//! > overlapping, fragmented detections become one clean substitution —
//! > and how does that substitution get undone later?
//!
//! ## Pipeline
//!
//! ```text
//! Detectors (classifiers + regex) → Span Merger → Span Resolver
//!                                                       ↓
//!                              Substitution (redact | replace) + Log
//!                                                       ↓
//!                                                 Deanonymize
//! ```
//!
//! Detectors run independently over the input; each output is passed through
//! the adjacent-fragment merger, filtered by the detector's trusted kinds,
//! and accumulated. The resolver reduces the accumulated candidates to a
//! non-overlapping, deduplicated span set, and the substitution engine
//! rewrites the text against that set while recording an ordered, replayable
//! log. The log makes the transformation reversible: `deanonymize` replays
//! it against derived text.
//!
//! ## Determinism Guarantees
//!
//! - Resolution is a stable sort-and-sweep: same candidate multiset, same
//!   surviving spans, regardless of detector iteration order (ties between
//!   positionally identical spans go to the earlier-registered source).
//! - Synthetic replacement values come from a seeded RNG: same seed, same
//!   sequence, across runs.
//!
//! ## Example
//!
//! ```rust
//! use textanon::{Anonymizer, EntityKind};
//!
//! # fn main() -> Result<(), textanon::AnonymizerError> {
//! let mut anonymizer = Anonymizer::builder()
//!     .kinds([EntityKind::Phone, EntityKind::Email])
//!     .build()?;
//!
//! let masked = anonymizer.redact("Appelez le 06 12 34 56 78")?;
//! assert_eq!(masked, "Appelez le [REDACTED]");
//!
//! let restored = anonymizer.deanonymize(&masked);
//! assert_eq!(restored, "Appelez le 06 12 34 56 78");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod anonymizer;
pub mod detect;
pub mod generate;
pub mod merge;
pub mod resolve;
pub mod types;

// Re-exports
pub use anonymizer::{Anonymizer, AnonymizerBuilder, AnonymizerError, REDACTION_MARKER};
pub use detect::{Detector, DetectorError, DetectorRegistry, EmailDetector, PhoneDetector};
pub use generate::{FakeDataGenerator, GeneratorError, ValueGenerator, DEFAULT_SEED};
pub use merge::merge_adjacent;
pub use resolve::resolve;
pub use types::{
    EntityKind, EntitySpan, RedactionRecord, ReplacementRecord, SubstitutionLog,
};
