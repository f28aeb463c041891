// 🔎 Term Resolver - Resolve terms against the concept vocabulary
// By value for free text, by identifier for curriculum concepts

use serde_json::Value;
use std::sync::Arc;

use crate::lookup::{target_predicate, LookupResult, VocabularyLookup};
use crate::ns::{p, to_curie, Scheme};
use crate::reshape::TermShape;
use crate::value::{
    as_literal, canonicalize_id, first_value, has_exact_type, literal_text, node_id, synthesize_id,
    values_of, Record,
};

/// Outcome of resolving a term by value
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Predicate the term belongs under
    pub target: &'static str,
    pub term: Record,
    pub exact_match: Option<String>,
}

/// TermResolver - Lookup-driven resolution over the concept set scheme
#[derive(Clone)]
pub struct TermResolver {
    lookup: Arc<dyn VocabularyLookup>,
}

impl TermResolver {
    pub const SCHEME: Scheme = Scheme::ConceptSet;

    pub fn new(lookup: Arc<dyn VocabularyLookup>) -> Self {
        TermResolver { lookup }
    }

    pub fn lookup(&self) -> &Arc<dyn VocabularyLookup> {
        &self.lookup
    }

    /// Search strings in order: the code, then every label text
    fn candidates(term: &Record) -> Vec<&str> {
        first_value(term, p::TERM_CODE)
            .into_iter()
            .chain(values_of(term, p::NAME).iter().filter_map(literal_text))
            .collect()
    }

    /// Resolve a free-text `DefinedTerm` and decide where it belongs.
    ///
    /// Panics unless `@type` is exactly `[DefinedTerm]`; callers reshape first.
    pub fn resolve_by_value(&self, term: Record) -> Resolution {
        assert!(
            has_exact_type(&term, p::DEFINED_TERM),
            "resolve_by_value expects a DefinedTerm, got {:?}",
            term.get("@type")
        );

        let mut result = LookupResult::not_found();
        for candidate in TermResolver::candidates(&term) {
            result = self.lookup.lookup_by_value(TermResolver::SCHEME, candidate);
            if result.concept_type.is_some() {
                break;
            }
        }

        match (result.id.is_some(), result.concept_type) {
            (true, Some(concept_type)) => {
                let target = target_predicate(Some(concept_type));
                tracing::debug!(
                    concept_type = %concept_type,
                    target = %to_curie(target),
                    "term reclassified"
                );
                Resolution {
                    target,
                    term: build_from_lookup(&result, target),
                    exact_match: result.exact_match,
                }
            }
            _ => Resolution {
                target: p::KEYWORDS,
                term: synthesize_id(term),
                exact_match: None,
            },
        }
    }

    /// Refresh a curriculum term from the vocabulary by its `@id`.
    ///
    /// Unknown ids are reported under the target's curie and the term is
    /// returned unchanged.
    pub fn resolve_by_identifier(
        &self,
        mut term: Record,
        target: &str,
        shape: TermShape,
    ) -> (Record, Option<String>) {
        let Some(term_id) = node_id(&term) else {
            return (term, None);
        };
        let probe = canonicalize_id(term_id);
        let result = self.lookup.lookup_by_id(TermResolver::SCHEME, &probe);

        let Some(canonical_id) = result.id.clone() else {
            self.lookup.report_not_found(&to_curie(target), &probe);
            return (term, None);
        };

        term.insert("@id".to_string(), Value::String(canonical_id));
        if !result.labels.is_empty() {
            term.insert(p::NAME.to_string(), label_literals(&result));
        }
        if let Some(identifier) = &result.identifier {
            term.insert(
                shape.code_predicate().to_string(),
                Value::Array(vec![as_literal(identifier, None)]),
            );
        }
        (term, result.exact_match)
    }
}

fn label_literals(result: &LookupResult) -> Value {
    Value::Array(
        result
            .labels
            .iter()
            .map(|label| as_literal(&label.text, label.language.as_deref()))
            .collect(),
    )
}

/// Build a fresh term for `target` from a lookup result; empty fields are omitted
pub fn build_from_lookup(result: &LookupResult, target: &str) -> Record {
    let shape = TermShape::for_predicate(target);
    let mut term = Record::new();
    term.insert("@type".to_string(), shape.type_value());
    if let Some(id) = &result.id {
        term.insert("@id".to_string(), Value::String(id.clone()));
    }
    if let Some(identifier) = &result.identifier {
        term.insert(
            shape.code_predicate().to_string(),
            Value::Array(vec![as_literal(identifier, None)]),
        );
    }
    if let Some(source) = &result.source {
        term.insert(
            shape.defining_predicate().to_string(),
            Value::Array(vec![as_literal(source, None)]),
        );
    }
    if !result.labels.is_empty() {
        term.insert(p::NAME.to_string(), label_literals(result));
    }
    term
}

// ============================================================================
// TESTS
// ============================================================================
