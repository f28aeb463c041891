// 🏛️ Attribute Registry - What each enriched predicate means
// Per predicate: human documentation and the lookups it reports through

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ns::Scheme;

// ============================================================================
// REPORT KIND
// ============================================================================

/// Diagnostic sink a lookup miss is reported through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReportKind {
    Invalid,
    NotFound,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Invalid => "invalid",
            ReportKind::NotFound => "not_found",
        }
    }
}

// ============================================================================
// ATTRIBUTE DEFINITION
// ============================================================================

/// AttributeDefinition - Documentation and lookup usage of one predicate
///
/// `lookups` maps a scheme name to the report kinds used for misses and the
/// curie each one is reported under. A scheme may be listed with no report
/// kinds when misses are silent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    /// Predicate curie (e.g. "schema:teaches"); the registry key
    #[serde(skip)]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub lookups: BTreeMap<String, BTreeMap<String, String>>,
}

impl AttributeDefinition {
    pub fn new() -> Self {
        AttributeDefinition::default()
    }

    /// Builder: add documentation
    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    /// Builder: scheme is consulted, misses are silent
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.lookups.entry(scheme.to_string()).or_default();
        self
    }

    /// Builder: misses in `scheme` are reported as `kind` under `key`
    pub fn with_lookup(mut self, scheme: Scheme, kind: ReportKind, key: impl Into<String>) -> Self {
        self.lookups
            .entry(scheme.to_string())
            .or_default()
            .insert(kind.as_str().to_string(), key.into());
        self
    }

    /// Nothing worth reporting
    pub fn is_empty(&self) -> bool {
        self.documentation.is_none() && self.lookups.is_empty()
    }
}

// ============================================================================
// ATTRIBUTE REGISTRY
// ============================================================================

/// AttributeRegistry - Introspection over an enricher's rule table
///
/// Serializes as `{curie: {"documentation": ..., "lookups": {...}}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeRegistry {
    attributes: BTreeMap<String, AttributeDefinition>,
}

impl AttributeRegistry {
    pub fn new() -> Self {
        AttributeRegistry::default()
    }

    /// Register an attribute under `id`; empty definitions are skipped
    pub fn register(&mut self, id: impl Into<String>, mut attr: AttributeDefinition) {
        if attr.is_empty() {
            return;
        }
        attr.id = id.into();
        self.attributes.insert(attr.id.clone(), attr);
    }

    pub fn get(&self, id: &str) -> Option<&AttributeDefinition> {
        self.attributes.get(id)
    }

    pub fn list_ids(&self) -> Vec<String> {
        self.attributes.keys().cloned().collect()
    }

    pub fn list_all(&self) -> Vec<&AttributeDefinition> {
        self.attributes.values().collect()
    }

    pub fn count(&self) -> usize {
        self.attributes.len()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_definitions_are_skipped() {
        let mut registry = AttributeRegistry::new();
        registry.register("schema:learningResourceType", AttributeDefinition::new());
        registry.register(
            "schema:isAccessibleForFree",
            AttributeDefinition::new().with_documentation("Booleans only"),
        );
        assert_eq!(registry.count(), 1);
        assert!(registry.get("schema:learningResourceType").is_none());
        assert_eq!(registry.get("schema:isAccessibleForFree").unwrap().id, "schema:isAccessibleForFree");
    }

    #[test]
    fn test_registry_json_shape() {
        let mut registry = AttributeRegistry::new();
        registry.register(
            "schema:teaches",
            AttributeDefinition::new()
                .with_documentation("Curriculum terms")
                .with_lookup(Scheme::ConceptSet, ReportKind::NotFound, "schema:teaches"),
        );
        registry.register(
            "schema:keywords",
            AttributeDefinition::new().with_scheme(Scheme::ConceptSet),
        );
        registry.register(
            "dcterms:accessRights",
            AttributeDefinition::new().with_lookup(
                Scheme::AccessRights,
                ReportKind::Invalid,
                "dcterms:accessRights",
            ),
        );

        assert_eq!(
            registry.to_json(),
            json!({
                "dcterms:accessRights": {
                    "lookups": {"urn:lms:accessrights": {"invalid": "dcterms:accessRights"}}
                },
                "schema:keywords": {"lookups": {"urn:edurep:conceptset": {}}},
                "schema:teaches": {
                    "documentation": "Curriculum terms",
                    "lookups": {"urn:edurep:conceptset": {"not_found": "schema:teaches"}}
                },
            })
        );
        assert_eq!(
            registry.list_ids(),
            vec!["dcterms:accessRights", "schema:keywords", "schema:teaches"]
        );
    }
}
