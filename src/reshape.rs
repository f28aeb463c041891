// ✂️ Record Reshaper - Table-driven copy between term shapes
// Only recognized fields survive; renamed fields merge into their new home

use serde_json::Value;
use std::collections::HashMap;

use crate::ns::p;
use crate::value::{dedupe_by_value, Record};

// ============================================================================
// TERM SHAPE
// ============================================================================

/// The two shapes a vocabulary term can take in a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermShape {
    /// `DefinedTerm` with `termCode` / `inDefinedTermSet`
    DefinedTerm,
    /// `AlignmentObject` with `targetName` / `educationalFramework`
    AlignmentObject,
}

impl TermShape {
    /// Shape used for terms stored under a predicate
    pub fn for_predicate(predicate: &str) -> Self {
        if predicate == p::EDUCATIONAL_ALIGNMENT {
            TermShape::AlignmentObject
        } else {
            TermShape::DefinedTerm
        }
    }

    pub fn type_iri(&self) -> &'static str {
        match self {
            TermShape::DefinedTerm => p::DEFINED_TERM,
            TermShape::AlignmentObject => p::ALIGNMENT_OBJECT,
        }
    }

    /// Field holding the short code
    pub fn code_predicate(&self) -> &'static str {
        match self {
            TermShape::DefinedTerm => p::TERM_CODE,
            TermShape::AlignmentObject => p::TARGET_NAME,
        }
    }

    /// Field naming the vocabulary the term belongs to
    pub fn defining_predicate(&self) -> &'static str {
        match self {
            TermShape::DefinedTerm => p::IN_DEFINED_TERM_SET,
            TermShape::AlignmentObject => p::EDUCATIONAL_FRAMEWORK,
        }
    }

    /// `@type` value for this shape: `[type_iri]`
    pub fn type_value(&self) -> Value {
        Value::Array(vec![Value::String(self.type_iri().to_string())])
    }
}

// ============================================================================
// FIELD MAPPING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldMapping {
    /// Keep under the same key
    Copy,
    /// Append to another key, deduplicated by `@value`
    MergeInto(&'static str),
    /// Leave out
    Drop,
}

/// Reshaper - One reshaping rule set
#[derive(Debug, Clone)]
pub struct Reshaper {
    fields: HashMap<&'static str, FieldMapping>,
    default: FieldMapping,
    forced_type: Option<TermShape>,
}

impl Reshaper {
    pub fn new() -> Self {
        Reshaper {
            fields: HashMap::new(),
            default: FieldMapping::Drop,
            forced_type: None,
        }
    }

    pub fn with_field(mut self, key: &'static str, mapping: FieldMapping) -> Self {
        self.fields.insert(key, mapping);
        self
    }

    /// Mapping for keys not listed explicitly
    pub fn with_default(mut self, mapping: FieldMapping) -> Self {
        self.default = mapping;
        self
    }

    /// Output `@type` is always `[shape]`
    pub fn with_forced_type(mut self, shape: TermShape) -> Self {
        self.forced_type = Some(shape);
        self
    }

    /// Keep a curriculum term as it is
    pub fn keep(shape: TermShape) -> Self {
        [
            "@type",
            "@id",
            p::NAME,
            shape.code_predicate(),
            shape.defining_predicate(),
        ]
        .into_iter()
        .fold(Reshaper::new(), |reshaper, key| reshaper.with_field(key, FieldMapping::Copy))
    }

    /// Turn a term of either shape into a keywords `DefinedTerm`
    pub fn to_keywords(shape: TermShape) -> Self {
        match shape {
            TermShape::DefinedTerm => {
                Reshaper::keep(TermShape::DefinedTerm).with_forced_type(TermShape::DefinedTerm)
            }
            TermShape::AlignmentObject => Reshaper::new()
                .with_field("@id", FieldMapping::Copy)
                .with_field(p::NAME, FieldMapping::Copy)
                .with_field(p::EDUCATIONAL_FRAMEWORK, FieldMapping::MergeInto(p::IN_DEFINED_TERM_SET))
                .with_field(p::TARGET_NAME, FieldMapping::MergeInto(p::TERM_CODE))
                .with_field(p::IN_DEFINED_TERM_SET, FieldMapping::MergeInto(p::IN_DEFINED_TERM_SET))
                .with_field(p::TERM_CODE, FieldMapping::MergeInto(p::TERM_CODE))
                .with_forced_type(TermShape::DefinedTerm),
        }
    }

    fn mapping(&self, key: &str) -> &FieldMapping {
        self.fields.get(key).unwrap_or(&self.default)
    }

    /// Produce a new term holding only the recognized fields
    pub fn apply(&self, term: &Record) -> Record {
        let mut shaped = Record::new();
        for (key, value) in term {
            if key == "@type" && self.forced_type.is_some() {
                continue;
            }
            match self.mapping(key) {
                FieldMapping::Copy => {
                    shaped.insert(key.clone(), value.clone());
                }
                FieldMapping::MergeInto(target) => {
                    let slot = shaped
                        .entry(target.to_string())
                        .or_insert_with(|| Value::Array(Vec::new()));
                    let mut merged = match slot.take() {
                        Value::Array(existing) => existing,
                        _ => Vec::new(),
                    };
                    match value {
                        Value::Array(values) => merged.extend(values.iter().cloned()),
                        other => merged.push(other.clone()),
                    }
                    *slot = Value::Array(dedupe_by_value(merged));
                }
                FieldMapping::Drop => {
                    tracing::trace!(key = %key, "reshape dropped field");
                }
            }
        }
        if let Some(shape) = self.forced_type {
            shaped.insert("@type".to_string(), shape.type_value());
        }
        shaped
    }
}

impl Default for Reshaper {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_shape_for_predicate() {
        assert_eq!(TermShape::for_predicate(p::EDUCATIONAL_ALIGNMENT), TermShape::AlignmentObject);
        assert_eq!(TermShape::for_predicate(p::TEACHES), TermShape::DefinedTerm);
        assert_eq!(TermShape::AlignmentObject.code_predicate(), p::TARGET_NAME);
        assert_eq!(TermShape::DefinedTerm.defining_predicate(), p::IN_DEFINED_TERM_SET);
    }

    #[test]
    fn test_keep_drops_unrecognized_fields() {
        let term = record(json!({
            "@type": [p::DEFINED_TERM],
            "@id": "urn:uuid:onderwijs",
            p::IN_DEFINED_TERM_SET: [{"@value": "http://purl.edustandaard.nl/begrippenkader"}],
            p::TERM_CODE: [{"@value": "onderwijs"}],
            p::TARGET_NAME: [{"@value": "wrong key"}],
        }));
        let kept = Reshaper::keep(TermShape::DefinedTerm).apply(&term);
        assert!(kept.get(p::TARGET_NAME).is_none());
        assert_eq!(kept.len(), 4);
        assert_eq!(kept["@id"], json!("urn:uuid:onderwijs"));
    }

    #[test]
    fn test_alignment_to_keywords_renames_and_merges() {
        let term = record(json!({
            "@id": "urn:keyword:Niet_gespecificeerd",
            "@type": [p::ALIGNMENT_OBJECT, p::DEFINED_TERM],
            p::EDUCATIONAL_FRAMEWORK: [{"@value": "urn:keyword"}],
            p::IN_DEFINED_TERM_SET: [{"@value": "urn:keyword"}],
            p::NAME: [{"@value": "Niet gespecificeerd"}],
            p::TARGET_NAME: [{"@value": "Niet gespecificeerd"}],
            p::TERM_CODE: [{"@value": "Niet gespecificeerd"}],
            "https://schema.org/alignmentType": [{"@value": "educationalSubject"}],
        }));
        let shaped = Reshaper::to_keywords(TermShape::AlignmentObject).apply(&term);
        assert_eq!(
            Value::Object(shaped),
            json!({
                "@id": "urn:keyword:Niet_gespecificeerd",
                "@type": [p::DEFINED_TERM],
                p::IN_DEFINED_TERM_SET: [{"@value": "urn:keyword"}],
                p::NAME: [{"@value": "Niet gespecificeerd"}],
                p::TERM_CODE: [{"@value": "Niet gespecificeerd"}],
            })
        );
    }

    #[test]
    fn test_merge_keeps_distinct_values_in_order() {
        let term = record(json!({
            p::TERM_CODE: [{"@value": "a"}],
            p::TARGET_NAME: [{"@value": "b"}, {"@value": "a"}],
        }));
        let shaped = Reshaper::to_keywords(TermShape::AlignmentObject).apply(&term);
        assert_eq!(shaped[p::TERM_CODE], json!([{"@value": "a"}, {"@value": "b"}]));
    }

    #[test]
    fn test_term_to_keywords_forces_type() {
        let term = record(json!({"@id": "urn:keyword:Niet_gespecificeerd"}));
        let shaped = Reshaper::to_keywords(TermShape::DefinedTerm).apply(&term);
        assert_eq!(shaped["@type"], json!([p::DEFINED_TERM]));
    }

    #[test]
    fn test_default_mapping_copies_when_configured() {
        let term = record(json!({"@id": "x", "urn:other": [{"@value": "kept"}]}));
        let shaped = Reshaper::new().with_default(FieldMapping::Copy).apply(&term);
        assert_eq!(shaped, term);
    }
}
