// ⚠️ Errors - Failures surfaced to callers of the enrichment library
// Data-quality problems never end up here; they are reported to the lookup collaborator

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnrichError {
    /// Input was not a JSON object (or a list of them)
    #[error("Not a record: expected a JSON object, got {0}")]
    NotARecord(String),

    /// Modification timestamp supplied by the caller could not be parsed
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Scheme name not in the well-known table
    #[error("Unknown lookup scheme: {0}")]
    UnknownScheme(String),

    /// Concept type IRI not in the edurep terms enumeration
    #[error("Unknown concept type: {0}")]
    UnknownConceptType(String),

    /// Vocabulary source could not be read
    #[error("Vocabulary load failed at {location}: {reason}")]
    VocabularyLoad { location: String, reason: String },
}

pub type Result<T> = std::result::Result<T, EnrichError>;
