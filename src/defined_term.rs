// 🧭 Defined Terms - Route curriculum terms and keywords to where they belong
// Curriculum values are refreshed by id, the rest is looked up by value

use serde_json::Value;

use crate::attributes::{AttributeDefinition, ReportKind};
use crate::classifier::is_curriculum_value;
use crate::ns::{p, to_curie};
use crate::reshape::{Reshaper, TermShape};
use crate::resolver::{build_from_lookup, TermResolver};
use crate::rules::{Accumulator, FieldRule};
use crate::value::{as_literal, canonicalize_id, has_exact_type, node_id, Record};

// ============================================================================
// CURRICULUM PREDICATES
// ============================================================================

/// DefinedTermRule - Governs teaches, educationalLevel and educationalAlignment
///
/// Terms that are not trusted curriculum concepts are reshaped into keyword
/// terms and may be reclassified to another predicate by their lookup type.
pub struct DefinedTermRule {
    target: &'static str,
    shape: TermShape,
    keep: Reshaper,
    to_keywords: Reshaper,
    resolver: TermResolver,
}

impl DefinedTermRule {
    pub fn new(target: &'static str, resolver: TermResolver) -> Self {
        let shape = TermShape::for_predicate(target);
        DefinedTermRule {
            target,
            shape,
            keep: Reshaper::keep(shape),
            to_keywords: Reshaper::to_keywords(shape),
            resolver,
        }
    }

    pub fn target(&self) -> &'static str {
        self.target
    }

    fn route(&self, acc: &mut Accumulator, term: &Record) {
        let defining = self.shape.defining_predicate();
        match is_curriculum_value(term, defining) {
            (true, Some(vocabulary)) => {
                let mut kept = self.keep.apply(term);
                kept.insert(
                    defining.to_string(),
                    Value::Array(vec![as_literal(vocabulary, None)]),
                );
                kept.insert("@type".to_string(), self.shape.type_value());

                let (resolved, exact_match) =
                    self.resolver.resolve_by_identifier(kept, self.target, self.shape);
                acc.push(self.target, Value::Object(resolved));
                if let Some(id) = exact_match {
                    acc.add_exact_match(self.target, id);
                }
            }
            _ => {
                let resolution = self.resolver.resolve_by_value(self.to_keywords.apply(term));
                tracing::trace!(
                    from = %to_curie(self.target),
                    to = %to_curie(resolution.target),
                    "routed by value"
                );
                acc.push(resolution.target, Value::Object(resolution.term));
                if let Some(id) = resolution.exact_match {
                    acc.add_exact_match(resolution.target, id);
                }
            }
        }
    }
}

impl FieldRule for DefinedTermRule {
    fn apply(&self, acc: &mut Accumulator, _siblings: &Record, _predicate: &str, values: &[Value]) {
        for value in values {
            match value {
                Value::Object(term) if !term.contains_key("@value") => self.route(acc, term),
                // Plain text is not a term; keep it as a keyword
                other => acc.push(p::KEYWORDS, other.clone()),
            }
        }
    }

    fn describe(&self) -> AttributeDefinition {
        AttributeDefinition::new()
            .with_documentation(format!(
                "Terms from the curriculum vocabularies are refreshed by their id; unknown ids are \
                 kept and reported. Other terms are looked up by code or name and moved to the \
                 predicate matching their concept type ({}, {} or {}), or kept as {} with an id \
                 derived from term set and code.",
                to_curie(p::EDUCATIONAL_LEVEL),
                to_curie(p::TEACHES),
                to_curie(p::EDUCATIONAL_ALIGNMENT),
                to_curie(p::KEYWORDS),
            ))
            .with_lookup(TermResolver::SCHEME, ReportKind::NotFound, to_curie(self.target))
    }
}

// ============================================================================
// KEYWORDS
// ============================================================================

/// ImproveKeywords - Reclassify `DefinedTerm` keywords by lookup
///
/// Keywords produced here come before keywords accumulated earlier in the walk.
pub struct ImproveKeywords {
    resolver: TermResolver,
}

impl ImproveKeywords {
    pub fn new(resolver: TermResolver) -> Self {
        ImproveKeywords { resolver }
    }
}

impl FieldRule for ImproveKeywords {
    fn apply(&self, acc: &mut Accumulator, _siblings: &Record, _predicate: &str, values: &[Value]) {
        let mut keywords = Vec::with_capacity(values.len());
        for value in values {
            let term = match value {
                Value::Object(term) if has_exact_type(term, p::DEFINED_TERM) => term,
                other => {
                    keywords.push(other.clone());
                    continue;
                }
            };
            let resolution = self.resolver.resolve_by_value(term.clone());
            if let Some(id) = resolution.exact_match {
                acc.add_exact_match(resolution.target, id);
            }
            if resolution.target == p::KEYWORDS {
                keywords.push(Value::Object(resolution.term));
            } else {
                acc.push(resolution.target, Value::Object(resolution.term));
            }
        }
        keywords.extend(acc.take(p::KEYWORDS));
        acc.set(p::KEYWORDS, keywords);
    }

    fn describe(&self) -> AttributeDefinition {
        AttributeDefinition::new()
            .with_documentation(
                "Keywords typed as DefinedTerm are looked up by code or name; terms with a known \
                 concept type move to the matching curriculum predicate. Other keywords are kept.",
            )
            .with_scheme(TermResolver::SCHEME)
    }
}

// ============================================================================
// EXACT MATCH EXPANSION
// ============================================================================

/// Append a term for every collected exact match not yet present under its target.
///
/// Presence is checked on the canonicalized match id and again on the id the
/// lookup returns, so running this twice adds nothing new.
pub fn expand_exact_matches(acc: &mut Accumulator, resolver: &TermResolver) {
    let matches = acc.exact_matches.clone();
    for exact_match in matches {
        let probe = canonicalize_id(&exact_match.id);
        if has_node_id(acc, &exact_match.target, &probe) {
            continue;
        }

        let result = resolver.lookup().lookup_by_id(TermResolver::SCHEME, &probe);
        let Some(found_id) = result.id.as_deref() else {
            resolver
                .lookup()
                .report_not_found(&to_curie(&exact_match.target), &probe);
            continue;
        };
        if has_node_id(acc, &exact_match.target, found_id) {
            continue;
        }
        let term = build_from_lookup(&result, &exact_match.target);
        acc.push(&exact_match.target, Value::Object(term));
    }
}

fn has_node_id(acc: &Accumulator, target: &str, id: &str) -> bool {
    acc.values(target)
        .iter()
        .filter_map(Value::as_object)
        .any(|term| node_id(term) == Some(id))
}

// ============================================================================
// TESTS
// ============================================================================
