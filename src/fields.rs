// 🧾 Field Rules - Simple value substitutions for non-curriculum predicates
// Audience, controlled text values, cost, licensing and dates

use serde_json::Value;
use std::sync::Arc;

use crate::attributes::{AttributeDefinition, ReportKind};
use crate::lookup::{LookupResult, VocabularyLookup};
use crate::ns::{p, to_curie, Scheme};
use crate::rules::{Accumulator, FieldRule};
use crate::value::{
    as_literal, dedupe_by_value, first_value, is_absolute_uri, literal_text, normalize_datetime,
    synthesize_id, values_of, Record,
};

/// Text of a literal, or of the first literal under `predicate` for a node
fn text_of<'a>(value: &'a Value, predicate: &str) -> Option<&'a str> {
    literal_text(value).or_else(|| value.as_object().and_then(|node| first_value(node, predicate)))
}

/// Copy a literal with a new `@value`, keeping `@type`/`@language`
fn with_value(literal: &Value, new_value: Value) -> Value {
    let mut literal = literal.clone();
    if let Some(node) = literal.as_object_mut() {
        node.insert("@value".to_string(), new_value);
    }
    literal
}

// ============================================================================
// DEFINITION (audience)
// ============================================================================

/// DefinitionRule - Replace a value by a typed node from a vocabulary
///
/// The value is a literal or the first `identifier_predicate` literal of a
/// node. Hits become `{@type, @id, identifier_predicate: [identifier]}` under
/// `target`; misses are reported invalid and dropped.
pub struct DefinitionRule {
    target: String,
    scheme: Scheme,
    type_iri: String,
    identifier_predicate: String,
    lookup: Arc<dyn VocabularyLookup>,
}

impl DefinitionRule {
    pub fn new(
        target: impl Into<String>,
        scheme: Scheme,
        type_iri: impl Into<String>,
        identifier_predicate: impl Into<String>,
        lookup: Arc<dyn VocabularyLookup>,
    ) -> Self {
        DefinitionRule {
            target: target.into(),
            scheme,
            type_iri: type_iri.into(),
            identifier_predicate: identifier_predicate.into(),
            lookup,
        }
    }

    /// `schema:audience` against the intended end user roles
    pub fn audience(lookup: Arc<dyn VocabularyLookup>) -> Self {
        DefinitionRule::new(
            p::AUDIENCE,
            Scheme::IntendedEndUserRole,
            p::AUDIENCE_CLASS,
            p::AUDIENCE_TYPE,
            lookup,
        )
    }

    fn build(&self, result: &LookupResult) -> Value {
        let mut node = Record::new();
        node.insert(
            "@type".to_string(),
            Value::Array(vec![Value::String(self.type_iri.clone())]),
        );
        if let Some(id) = &result.id {
            node.insert("@id".to_string(), Value::String(id.clone()));
        }
        if let Some(identifier) = &result.identifier {
            node.insert(
                self.identifier_predicate.clone(),
                Value::Array(vec![as_literal(identifier, None)]),
            );
        }
        Value::Object(node)
    }
}

impl FieldRule for DefinitionRule {
    fn apply(&self, acc: &mut Accumulator, _siblings: &Record, _predicate: &str, values: &[Value]) {
        for value in values {
            let Some(text) = text_of(value, &self.identifier_predicate) else {
                continue;
            };
            let result = self.lookup.lookup_by_value(self.scheme, text);
            if result.is_resolved() {
                acc.push(&self.target, self.build(&result));
            } else {
                self.lookup.report_invalid(&to_curie(&self.target), text);
            }
        }
    }

    fn describe(&self) -> AttributeDefinition {
        AttributeDefinition::new().with_lookup(self.scheme, ReportKind::Invalid, to_curie(&self.target))
    }
}

// ============================================================================
// CONTROLLED TEXT
// ============================================================================

/// TextLookupRule - Replace literal text by the vocabulary identifier
pub struct TextLookupRule {
    predicate: &'static str,
    scheme: Scheme,
    lookup: Arc<dyn VocabularyLookup>,
}

impl TextLookupRule {
    pub fn new(predicate: &'static str, scheme: Scheme, lookup: Arc<dyn VocabularyLookup>) -> Self {
        TextLookupRule { predicate, scheme, lookup }
    }
}

impl FieldRule for TextLookupRule {
    fn apply(&self, acc: &mut Accumulator, _siblings: &Record, _predicate: &str, values: &[Value]) {
        for value in values {
            let Some(text) = literal_text(value) else {
                acc.push(self.predicate, value.clone());
                continue;
            };
            match self.lookup.lookup_by_value(self.scheme, text).identifier {
                Some(identifier) => acc.push(self.predicate, as_literal(&identifier, None)),
                None => self.lookup.report_invalid(&to_curie(self.predicate), text),
            }
        }
    }

    fn describe(&self) -> AttributeDefinition {
        AttributeDefinition::new().with_lookup(self.scheme, ReportKind::Invalid, to_curie(self.predicate))
    }
}

// ============================================================================
// COST
// ============================================================================

/// CostRule - `lom:cost` becomes `schema:isAccessibleForFree`
pub struct CostRule {
    lookup: Arc<dyn VocabularyLookup>,
}

impl CostRule {
    pub fn new(lookup: Arc<dyn VocabularyLookup>) -> Self {
        CostRule { lookup }
    }
}

impl FieldRule for CostRule {
    fn apply(&self, acc: &mut Accumulator, _siblings: &Record, _predicate: &str, values: &[Value]) {
        for text in values.iter().filter_map(literal_text) {
            match self.lookup.lookup_by_value(Scheme::Cost, text).identifier {
                Some(identifier) => acc.push(
                    p::IS_ACCESSIBLE_FOR_FREE,
                    serde_json::json!({"@value": identifier != "yes"}),
                ),
                None => self
                    .lookup
                    .report_invalid(&to_curie(p::IS_ACCESSIBLE_FOR_FREE), text),
            }
        }
    }

    fn describe(&self) -> AttributeDefinition {
        AttributeDefinition::new()
            .with_documentation(format!(
                "{} is looked up and stored as the boolean {} (cost \"yes\" means not free); \
                 {} itself is removed.",
                to_curie(p::COST),
                to_curie(p::IS_ACCESSIBLE_FOR_FREE),
                to_curie(p::COST),
            ))
            .with_lookup(Scheme::Cost, ReportKind::Invalid, to_curie(p::IS_ACCESSIBLE_FOR_FREE))
    }
}

/// AccessibleForFreeRule - Booleans only; "true"/"false" strings are converted
pub struct AccessibleForFreeRule;

impl FieldRule for AccessibleForFreeRule {
    fn apply(&self, acc: &mut Accumulator, _siblings: &Record, predicate: &str, values: &[Value]) {
        for value in values {
            let normalized = match literal_text(value).map(str::to_ascii_lowercase).as_deref() {
                Some("true") => with_value(value, Value::Bool(true)),
                Some("false") => with_value(value, Value::Bool(false)),
                _ => value.clone(),
            };
            acc.push(predicate, normalized);
        }
    }

    fn describe(&self) -> AttributeDefinition {
        AttributeDefinition::new()
            .with_documentation("Boolean; the strings \"true\" and \"false\" are converted to booleans.")
    }
}

// ============================================================================
// LICENSE
// ============================================================================

fn license_documentation() -> String {
    format!(
        "{} is looked up as a license; a known license sets {} to its URI and replaces {} \
         by the license labels.",
        to_curie(p::COPYRIGHT_AND_OTHER_RESTRICTIONS),
        to_curie(p::LICENSE),
        to_curie(p::COPYRIGHT_NOTICE),
    )
}

fn license_definition(documentation: String) -> AttributeDefinition {
    AttributeDefinition::new()
        .with_documentation(documentation)
        .with_lookup(Scheme::License, ReportKind::Invalid, to_curie(p::LICENSE))
}

fn append_licenses(acc: &mut Accumulator, licenses: Vec<Value>) {
    if licenses.is_empty() {
        return;
    }
    let mut values = acc.take(p::LICENSE);
    values.extend(licenses);
    acc.set(p::LICENSE, dedupe_by_value(values));
}

/// RestrictionsRule - `lom:copyrightAndOtherRestrictions` is kept and drives license and notice
pub struct RestrictionsRule {
    lookup: Arc<dyn VocabularyLookup>,
}

impl RestrictionsRule {
    pub fn new(lookup: Arc<dyn VocabularyLookup>) -> Self {
        RestrictionsRule { lookup }
    }
}

impl FieldRule for RestrictionsRule {
    fn apply(&self, acc: &mut Accumulator, _siblings: &Record, predicate: &str, values: &[Value]) {
        acc.extend(predicate, values.iter().cloned());

        let mut licenses = Vec::new();
        let mut notices = Vec::new();
        for text in values.iter().filter_map(literal_text) {
            let result = self.lookup.lookup_by_value(Scheme::License, text);
            let Some(uri) = &result.uri else {
                self.lookup.report_invalid(&to_curie(p::LICENSE), text);
                continue;
            };
            licenses.push(as_literal(uri, None));
            notices.extend(
                result
                    .labels
                    .iter()
                    .map(|label| as_literal(&label.text, label.language.as_deref())),
            );
        }
        append_licenses(acc, licenses);
        if !notices.is_empty() {
            acc.set(p::COPYRIGHT_NOTICE, dedupe_by_value(notices));
        }
    }

    fn describe(&self) -> AttributeDefinition {
        license_definition(license_documentation())
    }
}

/// CopyrightNoticeRule - Kept unless the record's restrictions name a known license
pub struct CopyrightNoticeRule {
    lookup: Arc<dyn VocabularyLookup>,
}

impl CopyrightNoticeRule {
    pub fn new(lookup: Arc<dyn VocabularyLookup>) -> Self {
        CopyrightNoticeRule { lookup }
    }

    fn replaced_by_license(&self, siblings: &Record) -> bool {
        values_of(siblings, p::COPYRIGHT_AND_OTHER_RESTRICTIONS)
            .iter()
            .filter_map(literal_text)
            .any(|text| {
                let result = self.lookup.lookup_by_value(Scheme::License, text);
                result.uri.is_some() && !result.labels.is_empty()
            })
    }
}

impl FieldRule for CopyrightNoticeRule {
    fn apply(&self, acc: &mut Accumulator, siblings: &Record, predicate: &str, values: &[Value]) {
        if self.replaced_by_license(siblings) {
            return;
        }
        acc.extend(predicate, values.iter().cloned());
    }

    fn describe(&self) -> AttributeDefinition {
        license_definition(format!(
            "{} is kept unless it is replaced by the labels of the license found through {}.",
            to_curie(p::COPYRIGHT_NOTICE),
            to_curie(p::COPYRIGHT_AND_OTHER_RESTRICTIONS),
        ))
    }
}

/// LicenseRule - `schema:license` values become license URIs
pub struct LicenseRule {
    lookup: Arc<dyn VocabularyLookup>,
}

impl LicenseRule {
    pub fn new(lookup: Arc<dyn VocabularyLookup>) -> Self {
        LicenseRule { lookup }
    }
}

impl FieldRule for LicenseRule {
    fn apply(&self, acc: &mut Accumulator, _siblings: &Record, _predicate: &str, values: &[Value]) {
        let mut licenses = Vec::new();
        for value in values {
            let Some(text) = literal_text(value) else {
                licenses.push(value.clone());
                continue;
            };
            match self.lookup.lookup_by_value(Scheme::License, text).uri {
                Some(uri) => licenses.push(as_literal(&uri, None)),
                None => {
                    self.lookup.report_invalid(&to_curie(p::LICENSE), text);
                    if is_absolute_uri(text.trim()) {
                        licenses.push(value.clone());
                    }
                }
            }
        }
        append_licenses(acc, licenses);
    }

    fn describe(&self) -> AttributeDefinition {
        license_definition(format!(
            "{} is looked up as a license and stored as its URI; unknown values are kept only \
             when they are URIs.",
            to_curie(p::LICENSE),
        ))
    }
}

// ============================================================================
// IDENTIFIERS AND DATES
// ============================================================================

/// SynthesizeIdRule - Give free-text terms an id from term set and code
pub struct SynthesizeIdRule;

impl FieldRule for SynthesizeIdRule {
    fn apply(&self, acc: &mut Accumulator, _siblings: &Record, predicate: &str, values: &[Value]) {
        for value in values {
            let term = match value {
                Value::Object(term) => Value::Object(synthesize_id(term.clone())),
                other => other.clone(),
            };
            acc.push(predicate, term);
        }
    }
}

/// DateModifiedRule - Normalize to `YYYY-MM-DDTHH:MM:SSZ`; unparseable values are kept
pub struct DateModifiedRule;

impl FieldRule for DateModifiedRule {
    fn apply(&self, acc: &mut Accumulator, _siblings: &Record, predicate: &str, values: &[Value]) {
        for value in values {
            let normalized = literal_text(value)
                .and_then(normalize_datetime)
                .map(|timestamp| with_value(value, Value::String(timestamp)))
                .unwrap_or_else(|| value.clone());
            acc.push(predicate, normalized);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
