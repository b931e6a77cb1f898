//! Reversible substitution engine.
//!
//! The [`Anonymizer`] ties the pipeline together: detectors produce candidate
//! spans, the merger and resolver reduce them to one consistent set, and the
//! substitution pass rewrites the text while recording a replayable log.
//!
//! ## Pipeline
//!
//! ```text
//! text → registry.scan (detect + merge + filter) → resolve → substitute
//!                                                              ↓
//!                                                    SubstitutionLog
//! ```
//!
//! Two strategies share the pipeline and differ only in the substituted
//! value: [`Anonymizer::redact`] masks every targeted span with
//! [`REDACTION_MARKER`]; [`Anonymizer::replace`] substitutes synthetic or
//! configured values. [`Anonymizer::deanonymize`] replays the retained log to
//! reconstruct the original wording.
//!
//! Substitution is offset-anchored against the immutable input snapshot, so
//! an entity's literal text occurring elsewhere in the document is never
//! touched by accident.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::detect::{Detector, DetectorError, DetectorRegistry, EmailDetector, PhoneDetector};
use crate::generate::{FakeDataGenerator, GeneratorError, ValueGenerator, DEFAULT_SEED};
use crate::resolve::resolve;
use crate::types::{
    EntityKind, EntitySpan, RedactionRecord, ReplacementRecord, SubstitutionLog,
};

/// Placeholder written over every span during redaction.
pub const REDACTION_MARKER: &str = "[REDACTED]";

/// Error type for anonymizer operations.
///
/// Every error is fatal to the current call: no partially transformed text
/// is ever returned. The log is cleared at the start of each
/// `redact`/`replace` call, so after a failed call it is empty.
#[derive(Debug, thiserror::Error)]
pub enum AnonymizerError {
    /// A configured kind name is outside the recognized enumeration.
    #[error("unsupported entity kind: {0}")]
    UnsupportedKind(String),
    /// A detector call failed; propagated without retry.
    #[error(transparent)]
    Detector(#[from] DetectorError),
    /// The value generator failed; propagated without retry.
    #[error(transparent)]
    Generator(#[from] GeneratorError),
}

/// Where replacement values come from.
enum ReplacementSource {
    /// Synthetic data from a [`ValueGenerator`].
    Synthetic(Box<dyn ValueGenerator>),
    /// Literal-by-kind mapping; unmapped kinds fall back to `"<TAG>"`.
    Mapping(HashMap<EntityKind, String>),
}

/// Reversible PII anonymizer.
///
/// Configure once through [`Anonymizer::builder`], then call
/// [`redact`](Self::redact) or [`replace`](Self::replace) per document. Each
/// call resets the internal [`SubstitutionLog`] and repopulates it, so one
/// log is valid for exactly one produced output;
/// [`deanonymize`](Self::deanonymize) consumes the current log read-only.
///
/// `redact`/`replace` take `&mut self` because the log is per-instance
/// mutable state: the borrow checker enforces the single-writer rule.
pub struct Anonymizer {
    /// Kinds acted on, in processing order.
    kinds: Vec<EntityKind>,
    registry: DetectorRegistry,
    source: ReplacementSource,
    log: SubstitutionLog,
}

impl std::fmt::Debug for Anonymizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Anonymizer")
            .field("kinds", &self.kinds)
            .finish_non_exhaustive()
    }
}

impl Anonymizer {
    /// Start configuring an anonymizer.
    pub fn builder() -> AnonymizerBuilder {
        AnonymizerBuilder::new()
    }

    /// Mask every targeted span with [`REDACTION_MARKER`].
    ///
    /// Kinds are processed in the configured order; the resulting log is
    /// sorted by span start, which is the order `deanonymize` replays it in.
    pub fn redact(&mut self, text: &str) -> Result<String, AnonymizerError> {
        self.log = SubstitutionLog::Empty;
        let resolved = self.detect_and_resolve(text)?;
        let targets = select_targets(&resolved, &self.kinds);

        let mut patches: Vec<Patch> = Vec::new();
        let mut records: Vec<RedactionRecord> = Vec::new();
        for kind in &self.kinds {
            for span in targets.iter().filter(|s| s.kind == *kind) {
                trace!(kind = %span.kind, start = span.start, "redacting span");
                patches.push(Patch {
                    start: span.start,
                    end: span.end,
                    value: REDACTION_MARKER.to_string(),
                });
                records.push(RedactionRecord {
                    kind: span.kind,
                    original: span.text.clone(),
                    start: span.start,
                    end: span.end,
                });
            }
        }

        let output = splice(text, patches);
        records.sort_by_key(|r| r.start);
        debug!(substitutions = records.len(), "redaction done");
        self.log = SubstitutionLog::Redactions(records);
        Ok(output)
    }

    /// Substitute every targeted span with a synthetic or configured value.
    ///
    /// Log records are appended in processing order (the configured kind
    /// order), not resorted by position; `deanonymize` replays them in that
    /// same order.
    pub fn replace(&mut self, text: &str) -> Result<String, AnonymizerError> {
        self.log = SubstitutionLog::Empty;
        let resolved = self.detect_and_resolve(text)?;
        let targets = select_targets(&resolved, &self.kinds);

        let kinds = self.kinds.clone();
        let mut patches: Vec<Patch> = Vec::new();
        let mut records: Vec<ReplacementRecord> = Vec::new();
        for kind in kinds {
            for span in targets.iter().filter(|s| s.kind == kind) {
                let value = match &mut self.source {
                    ReplacementSource::Synthetic(generator) => generator.generate(kind)?,
                    ReplacementSource::Mapping(map) => map
                        .get(&kind)
                        .cloned()
                        .unwrap_or_else(|| format!("<{}>", kind.tag())),
                };
                trace!(kind = %span.kind, start = span.start, "replacing span");
                patches.push(Patch {
                    start: span.start,
                    end: span.end,
                    value: value.clone(),
                });
                records.push(ReplacementRecord {
                    kind: span.kind,
                    original: span.text.clone(),
                    start: span.start,
                    end: span.end,
                    replacement: value,
                });
            }
        }

        let output = splice(text, patches);
        debug!(substitutions = records.len(), "replacement done");
        self.log = SubstitutionLog::Replacements(records);
        Ok(output)
    }

    /// Reconstruct original wording from the current log.
    ///
    /// Pure function of the log and the input; the log is not consumed.
    ///
    /// - Redaction logs: the text is split on whitespace; walking tokens
    ///   left to right, each token containing [`REDACTION_MARKER`] has the
    ///   marker substituted with the next unconsumed record's original
    ///   (records are start-sorted, matching marker order), and tokens are
    ///   re-joined with single spaces.
    /// - Replacement logs: each record, in processing order, has the first
    ///   occurrence of its replacement value swapped back to its original.
    /// - An empty log returns the input unchanged.
    pub fn deanonymize(&self, text: &str) -> String {
        match &self.log {
            SubstitutionLog::Empty => text.to_string(),
            SubstitutionLog::Redactions(records) => {
                let mut remaining = records.iter();
                let mut tokens: Vec<String> = Vec::new();
                for token in text.split_whitespace() {
                    if token.contains(REDACTION_MARKER) {
                        if let Some(record) = remaining.next() {
                            tokens.push(token.replacen(REDACTION_MARKER, &record.original, 1));
                            continue;
                        }
                    }
                    tokens.push(token.to_string());
                }
                tokens.join(" ")
            }
            SubstitutionLog::Replacements(records) => {
                let mut output = text.to_string();
                for record in records {
                    output = output.replacen(&record.replacement, &record.original, 1);
                }
                output
            }
        }
    }

    /// Read-only view of the log produced by the last `redact`/`replace`.
    pub fn log(&self) -> &SubstitutionLog {
        &self.log
    }

    /// Kinds acted on, in processing order.
    pub fn kinds(&self) -> &[EntityKind] {
        &self.kinds
    }

    /// Run all detectors and reduce their outputs to one consistent span set.
    fn detect_and_resolve(&self, text: &str) -> Result<Vec<EntitySpan>, AnonymizerError> {
        let candidates = self.registry.scan(text)?;
        let candidate_count = candidates.len();
        let resolved = resolve(candidates);
        debug!(
            candidates = candidate_count,
            resolved = resolved.len(),
            "span resolution"
        );
        Ok(resolved)
    }
}

/// Select the spans a substitution pass will act on.
///
/// The resolver removes contained spans but keeps partial overlaps, and a
/// partial overlap between two targeted spans cannot be spliced: the ranges
/// collide. Sweeping the start-sorted resolved set, a span is kept iff its
/// kind is targeted and it starts at or after the end of the last kept span;
/// the later-starting half of an overlapping pair is skipped. Skipped spans
/// get no patch and no log record, so output and log stay consistent.
fn select_targets<'a>(resolved: &'a [EntitySpan], kinds: &[EntityKind]) -> Vec<&'a EntitySpan> {
    let mut targets: Vec<&EntitySpan> = Vec::new();
    let mut cursor = 0;
    for span in resolved.iter().filter(|s| kinds.contains(&s.kind)) {
        if span.start < cursor {
            trace!(
                kind = %span.kind,
                start = span.start,
                end = span.end,
                "skipping span overlapping an earlier substitution"
            );
            continue;
        }
        cursor = span.end;
        targets.push(span);
    }
    targets
}

/// One pending substitution, anchored to original-snapshot offsets.
struct Patch {
    start: usize,
    end: usize,
    value: String,
}

/// Rebuild `text` with every patch applied.
///
/// Patches must address disjoint ranges (guaranteed by `select_targets`);
/// they are applied by position regardless of the order they were collected
/// in.
fn splice(text: &str, mut patches: Vec<Patch>) -> String {
    patches.sort_by_key(|p| p.start);

    let mut output = String::with_capacity(text.len());
    let mut cursor = 0;
    for patch in patches {
        output.push_str(&text[cursor..patch.start]);
        output.push_str(&patch.value);
        cursor = patch.end;
    }
    output.push_str(&text[cursor..]);
    output
}

/// Configuration-time builder for [`Anonymizer`].
///
/// Kind names parsed from strings are validated at [`build`](Self::build);
/// an unknown name fails the whole construction with
/// [`AnonymizerError::UnsupportedKind`] before any call can run.
pub struct AnonymizerBuilder {
    kinds: Vec<EntityKind>,
    kind_names: Vec<String>,
    registry: DetectorRegistry,
    builtin_detectors: bool,
    source: SourceConfig,
}

enum SourceConfig {
    Seeded(u64),
    Generator(Box<dyn ValueGenerator>),
    Mapping(HashMap<EntityKind, String>),
}

impl AnonymizerBuilder {
    fn new() -> Self {
        Self {
            kinds: Vec::new(),
            kind_names: Vec::new(),
            registry: DetectorRegistry::new(),
            builtin_detectors: true,
            source: SourceConfig::Seeded(DEFAULT_SEED),
        }
    }

    /// Set the kinds to act on, in processing order.
    pub fn kinds(mut self, kinds: impl IntoIterator<Item = EntityKind>) -> Self {
        self.kinds.extend(kinds);
        self
    }

    /// Set kinds by canonical tag (`"PER"`, `"ADDRESS"`, ...), in processing
    /// order. Unknown tags are rejected at `build`.
    pub fn kind_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.kind_names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Register a detector with the kinds it is trusted to emit.
    ///
    /// Detectors run in registration order; the built-in phone and email
    /// detectors (unless disabled) run after all registered ones.
    pub fn detector(
        mut self,
        detector: impl Detector + 'static,
        filter: impl IntoIterator<Item = EntityKind>,
    ) -> Self {
        self.registry.register(detector, filter);
        self
    }

    /// Skip registration of the built-in phone and email regex detectors.
    pub fn without_builtin_detectors(mut self) -> Self {
        self.builtin_detectors = false;
        self
    }

    /// Use the built-in synthetic generator with this seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.source = SourceConfig::Seeded(seed);
        self
    }

    /// Use a custom value generator for replacement values.
    pub fn generator(mut self, generator: impl ValueGenerator + 'static) -> Self {
        self.source = SourceConfig::Generator(Box::new(generator));
        self
    }

    /// Replace with literal values by kind instead of synthetic data.
    ///
    /// Kinds absent from the mapping fall back to `"<TAG>"`. Pass an empty
    /// map to get the pure-placeholder behavior.
    pub fn replacements(mut self, mapping: HashMap<EntityKind, String>) -> Self {
        self.source = SourceConfig::Mapping(mapping);
        self
    }

    /// Validate the configuration and build the anonymizer.
    pub fn build(self) -> Result<Anonymizer, AnonymizerError> {
        let mut kinds = self.kinds;
        for name in &self.kind_names {
            let kind = EntityKind::from_tag(name)
                .ok_or_else(|| AnonymizerError::UnsupportedKind(name.clone()))?;
            kinds.push(kind);
        }
        if kinds.is_empty() {
            kinds.extend(EntityKind::DEFAULT);
        }
        // A kind listed twice would select its spans twice; keep the first
        // occurrence so processing order stays well defined.
        let mut seen: HashSet<EntityKind> = HashSet::new();
        kinds.retain(|kind| seen.insert(*kind));

        let mut registry = self.registry;
        if self.builtin_detectors {
            registry.register(PhoneDetector::new(), [EntityKind::Phone]);
            registry.register(EmailDetector::new(), [EntityKind::Email]);
        }

        let source = match self.source {
            SourceConfig::Seeded(seed) => {
                ReplacementSource::Synthetic(Box::new(FakeDataGenerator::seeded(seed)))
            }
            SourceConfig::Generator(generator) => ReplacementSource::Synthetic(generator),
            SourceConfig::Mapping(mapping) => ReplacementSource::Mapping(mapping),
        };

        debug!(
            kinds = kinds.len(),
            detectors = registry.len(),
            "anonymizer configured"
        );

        Ok(Anonymizer {
            kinds,
            registry,
            source,
            log: SubstitutionLog::Empty,
        })
    }
}

impl Default for AnonymizerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Locates configured literals in the input, one span per occurrence.
    struct StubDetector {
        entities: Vec<(EntityKind, &'static str)>,
    }

    impl StubDetector {
        fn new(entities: Vec<(EntityKind, &'static str)>) -> Self {
            Self { entities }
        }
    }

    impl Detector for StubDetector {
        fn name(&self) -> &str {
            "stub"
        }

        fn detect(&self, text: &str) -> Result<Vec<EntitySpan>, DetectorError> {
            let mut spans = Vec::new();
            for (kind, literal) in &self.entities {
                for (start, matched) in text.match_indices(literal) {
                    spans.push(EntitySpan::new(
                        *kind,
                        0.99,
                        matched,
                        start,
                        start + matched.len(),
                    ));
                }
            }
            spans.sort_by_key(|s| s.start);
            Ok(spans)
        }
    }

    struct FailingGenerator;

    impl ValueGenerator for FailingGenerator {
        fn generate(&mut self, kind: EntityKind) -> Result<String, GeneratorError> {
            Err(GeneratorError {
                kind,
                reason: "backend unavailable".to_string(),
            })
        }
    }

    fn person_anonymizer() -> AnonymizerBuilder {
        Anonymizer::builder()
            .kinds([EntityKind::Person])
            .detector(
                StubDetector::new(vec![(EntityKind::Person, "John Doe")]),
                EntityKind::ALL,
            )
    }

    #[test]
    fn test_unknown_kind_name_fails_build() {
        let err = Anonymizer::builder()
            .kind_names(["PER", "SSN"])
            .build()
            .unwrap_err();
        match err {
            AnonymizerError::UnsupportedKind(name) => assert_eq!(name, "SSN"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_default_kinds_when_unconfigured() {
        let anon = Anonymizer::builder().build().unwrap();
        assert_eq!(anon.kinds(), EntityKind::DEFAULT.as_slice());
    }

    #[test]
    fn test_redact_log_sorted_by_start() {
        // Kind order is LOC then PER, but PER appears first in the text;
        // the redaction log must still come out start-sorted.
        let mut anon = Anonymizer::builder()
            .kinds([EntityKind::Location, EntityKind::Person])
            .detector(
                StubDetector::new(vec![
                    (EntityKind::Person, "Jean"),
                    (EntityKind::Location, "Paris"),
                ]),
                EntityKind::ALL,
            )
            .build()
            .unwrap();

        let output = anon.redact("Jean visite Paris.").unwrap();
        assert_eq!(output, "[REDACTED] visite [REDACTED].");

        let SubstitutionLog::Redactions(records) = anon.log() else {
            panic!("expected redaction log");
        };
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].original, "Jean");
        assert_eq!(records[1].original, "Paris");
    }

    #[test]
    fn test_replace_log_keeps_kind_order() {
        let mut anon = Anonymizer::builder()
            .kinds([EntityKind::Location, EntityKind::Person])
            .detector(
                StubDetector::new(vec![
                    (EntityKind::Person, "Jean"),
                    (EntityKind::Location, "Paris"),
                ]),
                EntityKind::ALL,
            )
            .replacements(HashMap::new())
            .build()
            .unwrap();

        anon.replace("Jean visite Paris.").unwrap();
        let SubstitutionLog::Replacements(records) = anon.log() else {
            panic!("expected replacement log");
        };
        // Processing order: LOC before PER, despite PER coming first in text.
        assert_eq!(records[0].kind, EntityKind::Location);
        assert_eq!(records[1].kind, EntityKind::Person);
    }

    /// Emits a fixed span list regardless of input.
    struct PinnedDetector {
        spans: Vec<EntitySpan>,
    }

    impl Detector for PinnedDetector {
        fn name(&self) -> &str {
            "pinned"
        }

        fn detect(&self, _text: &str) -> Result<Vec<EntitySpan>, DetectorError> {
            Ok(self.spans.clone())
        }
    }

    #[test]
    fn test_offset_anchored_redaction_leaves_duplicates_alone() {
        // Only the first "Paris" is a detected span; the second occurrence of
        // the same literal stays intact because substitution is anchored to
        // the span's offsets, not to the literal text.
        let mut anon = Anonymizer::builder()
            .kinds([EntityKind::Location])
            .detector(
                PinnedDetector {
                    spans: vec![EntitySpan::new(EntityKind::Location, 0.99, "Paris", 0, 5)],
                },
                [EntityKind::Location],
            )
            .build()
            .unwrap();

        let output = anon.redact("Paris adore Paris").unwrap();
        assert_eq!(output, "[REDACTED] adore Paris");
    }

    #[test]
    fn test_partially_overlapping_spans_substitute_without_panic() {
        // Two detectors disagree on the name boundary: (0,7) and (5,11)
        // partially overlap, so the resolver keeps both. Substitution must
        // act on the earlier span, skip the colliding one, and keep the log
        // in step with the output.
        let text = "Jean Dupont est la.";
        let mut anon = Anonymizer::builder()
            .kinds([EntityKind::Person])
            .detector(
                PinnedDetector {
                    spans: vec![EntitySpan::new(EntityKind::Person, 0.9, "Jean Du", 0, 7)],
                },
                [EntityKind::Person],
            )
            .detector(
                PinnedDetector {
                    spans: vec![EntitySpan::new(EntityKind::Person, 0.8, "Dupont", 5, 11)],
                },
                [EntityKind::Person],
            )
            .build()
            .unwrap();

        let output = anon.redact(text).unwrap();
        assert_eq!(output, "[REDACTED]nt est la.");

        let SubstitutionLog::Redactions(records) = anon.log() else {
            panic!("expected redaction log");
        };
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].original, "Jean Du");
    }

    #[test]
    fn test_duplicate_configured_kind_substitutes_once() {
        let mut anon = Anonymizer::builder()
            .kinds([EntityKind::Person, EntityKind::Person])
            .detector(
                StubDetector::new(vec![(EntityKind::Person, "John Doe")]),
                EntityKind::ALL,
            )
            .build()
            .unwrap();

        let output = anon.redact("Bonjour John Doe.").unwrap();
        assert_eq!(output, "Bonjour [REDACTED].");
        assert_eq!(anon.log().len(), 1);
        assert_eq!(anon.kinds(), [EntityKind::Person].as_slice());
    }

    #[test]
    fn test_replace_mapping_fallback_placeholder() {
        let mut anon = person_anonymizer()
            .replacements(HashMap::new())
            .build()
            .unwrap();
        let output = anon.replace("Bonjour John Doe.").unwrap();
        assert_eq!(output, "Bonjour <PER>.");
    }

    #[test]
    fn test_generator_failure_aborts_call() {
        let mut anon = person_anonymizer()
            .generator(FailingGenerator)
            .build()
            .unwrap();
        let err = anon.replace("Bonjour John Doe.").unwrap_err();
        assert!(matches!(err, AnonymizerError::Generator(_)));
        // No partial log committed.
        assert!(anon.log().is_empty());
    }

    #[test]
    fn test_deanonymize_with_empty_log_is_identity() {
        let anon = Anonymizer::builder().build().unwrap();
        assert_eq!(anon.deanonymize("rien a restaurer"), "rien a restaurer");
    }

    #[test]
    fn test_log_reset_between_calls() {
        let mut anon = person_anonymizer().build().unwrap();
        anon.redact("John Doe est la.").unwrap();
        assert_eq!(anon.log().len(), 1);
        anon.redact("personne ici").unwrap();
        assert!(anon.log().is_empty());
    }

    #[test]
    fn test_splice_applies_patches_by_position() {
        let patches = vec![
            Patch {
                start: 12,
                end: 17,
                value: "X".to_string(),
            },
            Patch {
                start: 0,
                end: 4,
                value: "Y".to_string(),
            },
        ];
        assert_eq!(splice("Jean visite Paris", patches), "Y visite X");
    }
}
