//! Entity span types.
//!
//! An [`EntitySpan`] is the unit every pipeline stage operates on: a typed,
//! scored substring located by byte offsets into the text snapshot that
//! produced it. Detectors guarantee that `text` equals the snapshot slice
//! `[start, end)` at creation time; offsets are never recomputed against
//! mutated text later.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed enumeration of PII categories the pipeline recognizes.
///
/// Canonical uppercase tags (`PER`, `LOC`, ...) are the wire/config names;
/// they match the labels emitted by the NER classifiers this crate is
/// designed to sit behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Postal address.
    #[serde(rename = "ADDRESS")]
    Address,
    /// Person name.
    #[serde(rename = "PER")]
    Person,
    /// Location (city, region, country).
    #[serde(rename = "LOC")]
    Location,
    /// Date.
    #[serde(rename = "DATE")]
    Date,
    /// Organization name.
    #[serde(rename = "ORG")]
    Org,
    /// Miscellaneous proper noun.
    #[serde(rename = "MISC")]
    Misc,
    /// Telephone number.
    #[serde(rename = "TEL")]
    Phone,
    /// Email address.
    #[serde(rename = "MAIL")]
    Email,
}

impl EntityKind {
    /// Every recognized kind, in canonical order.
    pub const ALL: [EntityKind; 8] = [
        Self::Address,
        Self::Person,
        Self::Location,
        Self::Date,
        Self::Org,
        Self::Misc,
        Self::Phone,
        Self::Email,
    ];

    /// Kinds acted on when no explicit kind list is configured.
    pub const DEFAULT: [EntityKind; 6] = [
        Self::Address,
        Self::Person,
        Self::Location,
        Self::Date,
        Self::Org,
        Self::Misc,
    ];

    /// Canonical uppercase tag for this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Address => "ADDRESS",
            Self::Person => "PER",
            Self::Location => "LOC",
            Self::Date => "DATE",
            Self::Org => "ORG",
            Self::Misc => "MISC",
            Self::Phone => "TEL",
            Self::Email => "MAIL",
        }
    }

    /// Parse a canonical tag. Returns `None` for anything outside the
    /// enumeration; callers turn that into an unsupported-kind error.
    pub fn from_tag(s: &str) -> Option<Self> {
        match s {
            "ADDRESS" => Some(Self::Address),
            "PER" => Some(Self::Person),
            "LOC" => Some(Self::Location),
            "DATE" => Some(Self::Date),
            "ORG" => Some(Self::Org),
            "MISC" => Some(Self::Misc),
            "TEL" => Some(Self::Phone),
            "MAIL" => Some(Self::Email),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// A typed, scored, positioned substring identified as a candidate PII
/// occurrence.
///
/// `start` and `end` are byte offsets into the UTF-8 snapshot the span was
/// detected in, with `start <= end`. `text` is the matched substring itself,
/// equal to `snapshot[start..end]` at detection time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Entity category.
    pub kind: EntityKind,
    /// Detector confidence in `[0, 1]`. Regex detectors emit `1.0`.
    pub confidence: f32,
    /// The matched substring.
    pub text: String,
    /// Byte offset of the first matched byte.
    pub start: usize,
    /// Byte offset one past the last matched byte.
    pub end: usize,
}

impl EntitySpan {
    /// Create a new span.
    pub fn new(
        kind: EntityKind,
        confidence: f32,
        text: impl Into<String>,
        start: usize,
        end: usize,
    ) -> Self {
        debug_assert!(start <= end, "span start must not exceed end");
        Self {
            kind,
            confidence,
            text: text.into(),
            start,
            end,
        }
    }

    /// Length of the span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span covers zero bytes.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether this span's range fully contains `other`'s range.
    ///
    /// Containment is kind-blind and non-strict: a span contains itself.
    pub fn contains(&self, other: &EntitySpan) -> bool {
        other.start >= self.start && other.end <= self.end
    }
}
