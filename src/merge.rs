//! Adjacent-fragment merger.
//!
//! Sub-word tokenization inside an NER classifier can split one entity into
//! several adjacent same-kind fragments (a compound name like
//! "Cecile Da Costa" may surface as two `PER` spans that touch end-to-start).
//! This pass runs on each detector's output, before cross-detector
//! resolution, and fuses such runs back into single spans.

use crate::types::EntitySpan;

/// Fuse runs of touching same-kind spans in one left-to-right pass.
///
/// Two consecutive spans `a`, `b` fuse iff `a.kind == b.kind` and
/// `a.end == b.start` (zero gap). The fused span keeps the kind, takes
/// `max(a.confidence, b.confidence)`, concatenates the texts, and covers
/// `[a.start, b.end)`. Fusion is transitive: a run of N touching fragments
/// collapses to one span in a single pass.
///
/// Spans with a gap, a different kind, or an overlap that is not an exact
/// touch are emitted untouched. The input is expected in the detector's
/// left-to-right emission order.
///
/// The pass is idempotent: merged output contains no touching same-kind
/// neighbors, so a second application is a no-op.
pub fn merge_adjacent(spans: Vec<EntitySpan>) -> Vec<EntitySpan> {
    let mut merged: Vec<EntitySpan> = Vec::with_capacity(spans.len());

    let mut i = 0;
    while i < spans.len() {
        let mut current = spans[i].clone();
        let mut j = i + 1;
        while j < spans.len() && spans[j].kind == current.kind && spans[j].start == current.end {
            current.confidence = current.confidence.max(spans[j].confidence);
            current.text.push_str(&spans[j].text);
            current.end = spans[j].end;
            j += 1;
        }
        merged.push(current);
        i = j;
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntityKind;

    fn span(kind: EntityKind, confidence: f32, text: &str, start: usize) -> EntitySpan {
        EntitySpan::new(kind, confidence, text, start, start + text.len())
    }

    #[test]
    fn test_touching_same_kind_fuse() {
        let spans = vec![
            span(EntityKind::Person, 0.8, "Cecile", 0),
            span(EntityKind::Person, 0.6, " Da Costa", 6),
        ];
        let merged = merge_adjacent(spans);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "Cecile Da Costa");
        assert_eq!(merged[0].start, 0);
        assert_eq!(merged[0].end, 15);
        assert_eq!(merged[0].confidence, 0.8);
    }

    #[test]
    fn test_run_collapses_transitively() {
        let spans = vec![
            span(EntityKind::Org, 0.5, "Ban", 0),
            span(EntityKind::Org, 0.9, "que de ", 3),
            span(EntityKind::Org, 0.7, "France", 10),
        ];
        let merged = merge_adjacent(spans);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "Banque de France");
        assert_eq!(merged[0].confidence, 0.9);
        assert_eq!(merged[0].end, 16);
    }

    #[test]
    fn test_gap_is_not_fused() {
        let spans = vec![
            span(EntityKind::Person, 0.9, "Jean", 0),
            span(EntityKind::Person, 0.9, "Dupont", 5),
        ];
        let merged = merge_adjacent(spans);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_different_kind_is_not_fused() {
        let spans = vec![
            span(EntityKind::Person, 0.9, "Jean", 0),
            span(EntityKind::Location, 0.9, " Paris", 4),
        ];
        let merged = merge_adjacent(spans);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_overlap_is_not_fused() {
        // Overlapping but not an exact touch: left untouched, the resolver
        // deals with overlap.
        let spans = vec![
            span(EntityKind::Person, 0.9, "Jean D", 0),
            span(EntityKind::Person, 0.9, "Dupont", 5),
        ];
        let merged = merge_adjacent(spans);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_idempotent() {
        let spans = vec![
            span(EntityKind::Person, 0.8, "Cecile", 0),
            span(EntityKind::Person, 0.6, " Da Costa", 6),
            span(EntityKind::Location, 1.0, "Paris", 20),
        ];
        let once = merge_adjacent(spans);
        let twice = merge_adjacent(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_input() {
        assert!(merge_adjacent(Vec::new()).is_empty());
    }
}
