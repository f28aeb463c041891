// Kennisnet JSON-LD - Core Library
// Term resolution and enrichment of educational metadata records

pub mod ns;
pub mod error;
pub mod value;          // Value Normalizer
pub mod lookup;         // Vocabulary collaborator contract + in-memory table
pub mod classifier;     // Curriculum Classifier
pub mod reshape;        // Record Reshaper
pub mod resolver;       // Lookup-Driven Resolver
pub mod defined_term;   // Term-Resolution Orchestrator
pub mod rules;          // Record walker
pub mod fields;         // Simple field rules
pub mod attributes;     // Introspection registry
pub mod enrich;         // Enrichment Facade

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use error::{EnrichError, Result};
pub use ns::{to_curie, Scheme};
pub use value::{canonicalize_id, normalize_datetime, synthesize_id, Record};
pub use lookup::{
    ConceptType, Label, LookupResult, Report, Reports, VocabularyLookup, VocabularyTable,
};
pub use classifier::is_curriculum_value;
pub use reshape::{FieldMapping, Reshaper, TermShape};
pub use resolver::{build_from_lookup, Resolution, TermResolver};
pub use defined_term::{expand_exact_matches, DefinedTermRule, ImproveKeywords};
pub use rules::{Accumulator, ExactMatch, FieldRule, Rule, SwitchRule, Walker};
pub use attributes::{AttributeDefinition, AttributeRegistry, ReportKind};
pub use enrich::{prepare_enrich, Enricher};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
