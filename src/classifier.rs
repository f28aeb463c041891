// 🎓 Curriculum Classifier - Is a term already a trusted curriculum concept?
// Trusted concepts are resolved by identifier, everything else by value

use serde_json::Value;

use crate::value::{first_value, Record};

/// Vocabularies whose concepts are trusted, in tie-break order
pub const CURRICULUM_VOCABULARIES: [&str; 3] = [
    "http://purl.edustandaard.nl/begrippenkader",
    "https://opendata.slo.nl/curriculum/uuid",
    "http://purl.edustandaard.nl/concept",
];

/// True when `id` sits strictly below `vocabulary` (more than a bare separator)
fn is_below(id: &str, vocabulary: &str) -> bool {
    id.strip_prefix(vocabulary)
        .map(|rest| rest.chars().count() > 1)
        .unwrap_or(false)
}

/// Decide whether a term is a curriculum value.
///
/// Returns the matched vocabulary as well. A declared trusted term set wins
/// even when the term has no `@id` (then the term is not curriculum, but the
/// vocabulary is still reported). Otherwise the first vocabulary that prefixes
/// the `@id` wins.
pub fn is_curriculum_value(
    term: &Record,
    defining_predicate: &str,
) -> (bool, Option<&'static str>) {
    let term_id = term.get("@id").and_then(Value::as_str).unwrap_or("");

    let declared = first_value(term, defining_predicate);
    if let Some(vocabulary) = declared.and_then(|set| {
        CURRICULUM_VOCABULARIES
            .iter()
            .copied()
            .find(|vocabulary| *vocabulary == set)
    }) {
        return (!term_id.is_empty(), Some(vocabulary));
    }

    match CURRICULUM_VOCABULARIES
        .iter()
        .copied()
        .find(|vocabulary| !term_id.is_empty() && is_below(term_id, vocabulary))
    {
        Some(vocabulary) => (true, Some(vocabulary)),
        None => (false, None),
    }
}

// ============================================================================
// TESTS
// ============================================================================
