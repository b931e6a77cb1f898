//! Core types for the anonymization pipeline.

pub mod record;
pub mod span;

pub use record::{RedactionRecord, ReplacementRecord, SubstitutionLog};
pub use span::{EntityKind, EntitySpan};
