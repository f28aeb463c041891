// 🏷️ Enrichment Rules - Predicate-to-rule dispatch over a record
// One walk per record, predicates visited in input order

use serde_json::Value;
use std::collections::HashMap;
use std::slice;

use crate::attributes::AttributeDefinition;
use crate::defined_term::{DefinedTermRule, ImproveKeywords};
use crate::value::{is_literal, Record};

// ============================================================================
// ACCUMULATOR
// ============================================================================

/// A cross-vocabulary link found while resolving a term under `target`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactMatch {
    pub target: String,
    pub id: String,
}

/// Accumulator - The record being built during one walk
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Accumulator {
    pub record: Record,
    pub exact_matches: Vec<ExactMatch>,
}

impl Accumulator {
    pub fn new() -> Self {
        Accumulator::default()
    }

    /// Values already accumulated under a predicate
    pub fn values(&self, predicate: &str) -> &[Value] {
        match self.record.get(predicate) {
            Some(Value::Array(values)) => values,
            _ => &[],
        }
    }

    /// Move the values out, leaving the key in place for a later `set`
    pub fn take(&mut self, predicate: &str) -> Vec<Value> {
        match self.record.get_mut(predicate).map(Value::take) {
            Some(Value::Array(values)) => values,
            _ => Vec::new(),
        }
    }

    /// Replace the values; an empty list removes the predicate
    pub fn set(&mut self, predicate: &str, values: Vec<Value>) {
        if values.is_empty() {
            self.record.retain(|key, _| key != predicate);
        } else {
            self.record.insert(predicate.to_string(), Value::Array(values));
        }
    }

    pub fn push(&mut self, predicate: &str, value: Value) {
        let mut values = self.take(predicate);
        values.push(value);
        self.set(predicate, values);
    }

    pub fn extend(&mut self, predicate: &str, more: impl IntoIterator<Item = Value>) {
        let mut values = self.take(predicate);
        values.extend(more);
        self.set(predicate, values);
    }

    pub fn add_exact_match(&mut self, target: &str, id: impl Into<String>) {
        self.exact_matches.push(ExactMatch {
            target: target.to_string(),
            id: id.into(),
        });
    }

    pub fn into_record(self) -> Record {
        self.record
    }
}

// ============================================================================
// RULES
// ============================================================================

/// FieldRule - Rewrites the values of one predicate into the accumulator
pub trait FieldRule: Send + Sync {
    /// `siblings` is the full input node the values came from
    fn apply(&self, acc: &mut Accumulator, siblings: &Record, predicate: &str, values: &[Value]);

    /// Documentation and lookup usage for introspection
    fn describe(&self) -> AttributeDefinition {
        AttributeDefinition::new()
    }
}

pub enum Rule {
    /// Copy values, walking nested nodes
    Identity,
    /// Drop the predicate
    Ignore,
    Simple(Box<dyn FieldRule>),
    DefinedTerm(DefinedTermRule),
    Keywords(ImproveKeywords),
    Switch(SwitchRule),
}

impl Rule {
    pub fn simple(rule: impl FieldRule + 'static) -> Self {
        Rule::Simple(Box::new(rule))
    }

    pub fn describe(&self) -> AttributeDefinition {
        match self {
            Rule::Identity | Rule::Ignore | Rule::Switch(_) => AttributeDefinition::new(),
            Rule::Simple(rule) => rule.describe(),
            Rule::DefinedTerm(rule) => rule.describe(),
            Rule::Keywords(rule) => rule.describe(),
        }
    }
}

/// Kind key used by a switch: "@value" for literals, else the first `@type`
pub fn node_kind(value: &Value) -> Option<&str> {
    if is_literal(value) {
        return Some("@value");
    }
    match value.get("@type")? {
        Value::Array(types) => types.first()?.as_str(),
        Value::String(single) => Some(single.as_str()),
        _ => None,
    }
}

/// SwitchRule - Pick a rule per value by its node kind
pub struct SwitchRule {
    cases: HashMap<String, Rule>,
    default: Box<Rule>,
}

impl SwitchRule {
    pub fn new(default: Rule) -> Self {
        SwitchRule {
            cases: HashMap::new(),
            default: Box::new(default),
        }
    }

    pub fn with_case(mut self, kind: impl Into<String>, rule: Rule) -> Self {
        self.cases.insert(kind.into(), rule);
        self
    }

    fn select(&self, value: &Value) -> &Rule {
        node_kind(value)
            .and_then(|kind| self.cases.get(kind))
            .unwrap_or(self.default.as_ref())
    }
}

// ============================================================================
// WALKER
// ============================================================================

/// Walker - Applies the rule table to a record
pub struct Walker {
    rules: HashMap<String, Rule>,
    fallback: Rule,
}

impl Walker {
    /// Unlisted predicates are copied
    pub fn new() -> Self {
        Walker {
            rules: HashMap::new(),
            fallback: Rule::Identity,
        }
    }

    pub fn with_rule(mut self, predicate: impl Into<String>, rule: Rule) -> Self {
        self.rules.insert(predicate.into(), rule);
        self
    }

    /// Rule for predicates without an entry
    pub fn with_fallback(mut self, rule: Rule) -> Self {
        self.fallback = rule;
        self
    }

    pub fn rules(&self) -> impl Iterator<Item = (&String, &Rule)> {
        self.rules.iter()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Walk a record once, in input order
    pub fn walk(&self, record: &Record) -> Accumulator {
        let mut acc = Accumulator::new();
        for (predicate, value) in record {
            if predicate.starts_with('@') {
                acc.record.insert(predicate.clone(), value.clone());
                continue;
            }
            let values = match value {
                Value::Array(values) => values.as_slice(),
                single => slice::from_ref(single),
            };
            let rule = self.rules.get(predicate).unwrap_or(&self.fallback);
            self.apply(rule, &mut acc, record, predicate, values);
        }
        acc
    }

    fn apply(
        &self,
        rule: &Rule,
        acc: &mut Accumulator,
        siblings: &Record,
        predicate: &str,
        values: &[Value],
    ) {
        match rule {
            Rule::Identity => {
                let copied: Vec<Value> = values.iter().map(|value| self.copy_value(value)).collect();
                acc.extend(predicate, copied);
            }
            Rule::Ignore => {
                tracing::trace!(predicate, "ignored");
            }
            Rule::Simple(rule) => rule.apply(acc, siblings, predicate, values),
            Rule::DefinedTerm(rule) => rule.apply(acc, siblings, predicate, values),
            Rule::Keywords(rule) => rule.apply(acc, siblings, predicate, values),
            Rule::Switch(switch) => {
                for value in values {
                    self.apply(switch.select(value), acc, siblings, predicate, slice::from_ref(value));
                }
            }
        }
    }

    /// Nested entity nodes are walked with the same rules
    fn copy_value(&self, value: &Value) -> Value {
        match value {
            Value::Object(node) if !is_literal(value) => {
                let nested = self.walk(node);
                if !nested.exact_matches.is_empty() {
                    tracing::debug!(
                        count = nested.exact_matches.len(),
                        "exact matches in nested node not expanded"
                    );
                }
                Value::Object(nested.into_record())
            }
            other => other.clone(),
        }
    }
}

impl Default for Walker {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
