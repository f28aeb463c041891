// ✨ Enrichment Facade - One walk per record, then exact-match expansion
// Builds the predicate rule table once per vocabulary collaborator

use serde_json::Value;
use std::sync::Arc;

use crate::attributes::AttributeRegistry;
use crate::defined_term::{expand_exact_matches, DefinedTermRule, ImproveKeywords};
use crate::error::{EnrichError, Result};
use crate::fields::{
    AccessibleForFreeRule, CopyrightNoticeRule, CostRule, DateModifiedRule, DefinitionRule,
    LicenseRule, RestrictionsRule, SynthesizeIdRule, TextLookupRule,
};
use crate::lookup::VocabularyLookup;
use crate::ns::{p, to_curie, Scheme};
use crate::resolver::TermResolver;
use crate::rules::{Rule, SwitchRule, Walker};
use crate::value::{as_literal, normalize_datetime, Record};

/// Controlled text predicates and the scheme their values come from
const TEXT_LOOKUPS: [(&str, Scheme); 5] = [
    (p::CREATIVE_WORK_STATUS, Scheme::Status),
    (p::ACCESS_RIGHTS, Scheme::AccessRights),
    (p::AGGREGATION_LEVEL, Scheme::AggregationLevel),
    (p::ENCODING_FORMAT, Scheme::MimeType),
    (p::INTERACTIVITY_TYPE, Scheme::InteractivityType),
];

fn build_walker(lookup: &Arc<dyn VocabularyLookup>, resolver: &TermResolver) -> Walker {
    let walker = [p::TEACHES, p::EDUCATIONAL_LEVEL, p::EDUCATIONAL_ALIGNMENT]
        .into_iter()
        .fold(Walker::new(), |walker, target| {
            walker.with_rule(target, Rule::DefinedTerm(DefinedTermRule::new(target, resolver.clone())))
        })
        .with_rule(p::KEYWORDS, Rule::Keywords(ImproveKeywords::new(resolver.clone())));

    let walker = TEXT_LOOKUPS.into_iter().fold(walker, |walker, (predicate, scheme)| {
        walker.with_rule(predicate, Rule::simple(TextLookupRule::new(predicate, scheme, lookup.clone())))
    });

    walker
        .with_rule(p::AUDIENCE, Rule::simple(DefinitionRule::audience(lookup.clone())))
        .with_rule(p::COST, Rule::simple(CostRule::new(lookup.clone())))
        .with_rule(p::IS_ACCESSIBLE_FOR_FREE, Rule::simple(AccessibleForFreeRule))
        .with_rule(
            p::COPYRIGHT_AND_OTHER_RESTRICTIONS,
            Rule::simple(RestrictionsRule::new(lookup.clone())),
        )
        .with_rule(p::COPYRIGHT_NOTICE, Rule::simple(CopyrightNoticeRule::new(lookup.clone())))
        .with_rule(p::LICENSE, Rule::simple(LicenseRule::new(lookup.clone())))
        .with_rule(
            p::LEARNING_RESOURCE_TYPE,
            Rule::Switch(
                SwitchRule::new(Rule::Identity)
                    .with_case(p::DEFINED_TERM, Rule::simple(SynthesizeIdRule)),
            ),
        )
        .with_rule(p::DATE_MODIFIED, Rule::simple(DateModifiedRule))
}

fn build_registry(walker: &Walker) -> AttributeRegistry {
    let mut registry = AttributeRegistry::new();
    for (predicate, rule) in walker.rules() {
        registry.register(to_curie(predicate), rule.describe());
    }
    registry
}

// ============================================================================
// ENRICHER
// ============================================================================

/// Enricher - Term resolution and field normalization for JSON-LD records
///
/// Records are expanded JSON-LD nodes. Data-quality problems go to the
/// lookup collaborator's report sinks; they never fail a call.
pub struct Enricher {
    walker: Walker,
    resolver: TermResolver,
    registry: AttributeRegistry,
}

impl Enricher {
    pub fn new(lookup: Arc<dyn VocabularyLookup>) -> Self {
        let resolver = TermResolver::new(lookup.clone());
        let walker = build_walker(&lookup, &resolver);
        let registry = build_registry(&walker);
        tracing::debug!(rules = walker.rule_count(), "enricher ready");
        Enricher {
            walker,
            resolver,
            registry,
        }
    }

    /// Documentation and lookup usage per enriched predicate
    pub fn info(&self) -> &AttributeRegistry {
        &self.registry
    }

    /// Enrich one record.
    ///
    /// `date_modified` is used only when the record carries no
    /// `schema:dateModified`; it must parse as a timestamp either way.
    pub fn enrich(&self, record: &Record, date_modified: Option<&str>) -> Result<Record> {
        let date_modified = date_modified
            .map(|raw| {
                normalize_datetime(raw).ok_or_else(|| EnrichError::InvalidTimestamp(raw.to_string()))
            })
            .transpose()?;

        let mut acc = self.walker.walk(record);
        if !acc.exact_matches.is_empty() {
            tracing::debug!(count = acc.exact_matches.len(), "expanding exact matches");
            expand_exact_matches(&mut acc, &self.resolver);
        }

        if let Some(timestamp) = date_modified {
            if acc.values(p::DATE_MODIFIED).is_empty() {
                acc.set(p::DATE_MODIFIED, vec![as_literal(&timestamp, None)]);
            }
        }
        Ok(acc.into_record())
    }

    /// Enrich a JSON value holding a record or a list of records
    pub fn enrich_value(&self, value: &Value, date_modified: Option<&str>) -> Result<Value> {
        match value {
            Value::Object(record) => Ok(Value::Object(self.enrich(record, date_modified)?)),
            Value::Array(records) => records
                .iter()
                .map(|item| match item {
                    Value::Object(record) => Ok(Value::Object(self.enrich(record, date_modified)?)),
                    other => Err(EnrichError::NotARecord(kind_of(other).to_string())),
                })
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            other => Err(EnrichError::NotARecord(kind_of(other).to_string())),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

/// Build an enricher and its introspection registry for a collaborator
pub fn prepare_enrich(lookup: Arc<dyn VocabularyLookup>) -> (Enricher, AttributeRegistry) {
    let enricher = Enricher::new(lookup);
    let registry = enricher.info().clone();
    (enricher, registry)
}

// ============================================================================
// TESTS
// ============================================================================
