//! Overlap and duplicate resolution across detector outputs.
//!
//! Independent detectors frequently agree: two classifiers may both emit a
//! span for the same name, or one may emit a city span nested inside the
//! other's address span. Before substitution the concatenated candidates are
//! reduced to one consistent set in which no span is contained in another.
//!
//! ## Algorithm
//!
//! 1. Stable-sort candidates by `(start asc, end desc)`. Any container span
//!    then appears strictly before its contained spans when starts differ,
//!    and no later when starts are equal.
//! 2. Sweep left to right keeping the maximum `end` accepted so far. A
//!    candidate is dropped iff `end <= running_max_end` (it is contained in,
//!    or identical to, an already-accepted span); otherwise it is accepted
//!    and the running maximum advances.
//!
//! One pass, O(n log n) total, and deterministic: among spans sharing an
//! identical `(start, end)` the stable sort keeps the earliest pre-sort
//! occupant, so ties are broken by emission order, not by kind or
//! confidence. Containment is kind-blind.

use tracing::trace;

use crate::types::EntitySpan;

/// Reduce candidate spans to a non-overlapping, deduplicated set.
///
/// Post-conditions:
///
/// - no span in the result is contained in another (containment being
///   non-strict on `(start, end)` and ignoring kind),
/// - the result is sorted by `start` ascending,
/// - the result is a subset of the input: spans are only removed, never
///   invented or altered.
pub fn resolve(mut spans: Vec<EntitySpan>) -> Vec<EntitySpan> {
    // Stable: equal (start, end) keeps input order, which is the tie-break.
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut kept: Vec<EntitySpan> = Vec::with_capacity(spans.len());
    let mut max_end: Option<usize> = None;

    for span in spans {
        if let Some(end) = max_end {
            if span.end <= end {
                trace!(
                    kind = %span.kind,
                    start = span.start,
                    end = span.end,
                    "dropping contained span"
                );
                continue;
            }
        }
        max_end = Some(span.end);
        kept.push(span);
    }

    kept
}
