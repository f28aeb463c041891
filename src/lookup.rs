// 📚 Vocabulary Lookup - Results, collaborator contract and an in-memory table
// Lookups never fail: a miss is an empty result, diagnostics go to the reports

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use crate::error::EnrichError;
use crate::ns::{p, Scheme, EDUREP_TERMS};

// ============================================================================
// CONCEPT TYPE
// ============================================================================

/// Kind of concept a vocabulary entry describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ConceptType {
    EducationalLevel,
    EducationalObjective,
    Discipline,
}

impl ConceptType {
    pub fn name(&self) -> &'static str {
        match self {
            ConceptType::EducationalLevel => "EducationalLevel",
            ConceptType::EducationalObjective => "EducationalObjective",
            ConceptType::Discipline => "Discipline",
        }
    }

    /// Full IRI in the edurep terms namespace
    pub fn iri(&self) -> String {
        format!("{}{}", EDUREP_TERMS, self.name())
    }
}

impl fmt::Display for ConceptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConceptType {
    type Err = EnrichError;

    /// Accepts the full IRI or the bare name
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let name = s.strip_prefix(EDUREP_TERMS).unwrap_or(s);
        match name {
            "EducationalLevel" => Ok(ConceptType::EducationalLevel),
            "EducationalObjective" => Ok(ConceptType::EducationalObjective),
            "Discipline" => Ok(ConceptType::Discipline),
            _ => Err(EnrichError::UnknownConceptType(s.to_string())),
        }
    }
}

impl TryFrom<String> for ConceptType {
    type Error = EnrichError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ConceptType> for String {
    fn from(concept_type: ConceptType) -> Self {
        concept_type.iri()
    }
}

/// Destination predicate for a resolved concept; unclassified goes to keywords
pub fn target_predicate(concept_type: Option<ConceptType>) -> &'static str {
    match concept_type {
        Some(ConceptType::EducationalLevel) => p::EDUCATIONAL_LEVEL,
        Some(ConceptType::EducationalObjective) => p::TEACHES,
        Some(ConceptType::Discipline) => p::EDUCATIONAL_ALIGNMENT,
        None => p::KEYWORDS,
    }
}

// ============================================================================
// LOOKUP RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Label {
    pub fn new(text: impl Into<String>, language: Option<&str>) -> Self {
        Label {
            text: text.into(),
            language: language.map(str::to_string),
        }
    }
}

/// LookupResult - What the vocabulary knows about one concept
///
/// All fields empty means "not found". A result with an id but no type is
/// "found but unclassified".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResult {
    /// Canonical URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Canonical short code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,

    /// Term set the concept belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,

    /// Equivalent concept in another vocabulary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact_match: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub concept_type: Option<ConceptType>,

    /// Public URI (license deeds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl LookupResult {
    pub fn not_found() -> Self {
        LookupResult::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_label(mut self, text: impl Into<String>, language: Option<&str>) -> Self {
        self.labels.push(Label::new(text, language));
        self
    }

    pub fn with_exact_match(mut self, exact_match: impl Into<String>) -> Self {
        self.exact_match = Some(exact_match.into());
        self
    }

    pub fn with_type(mut self, concept_type: ConceptType) -> Self {
        self.concept_type = Some(concept_type);
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn is_not_found(&self) -> bool {
        self == &LookupResult::default()
    }

    /// Canonical id or identifier, whichever the vocabulary provides
    pub fn is_resolved(&self) -> bool {
        self.id.is_some() || self.identifier.is_some()
    }
}

// ============================================================================
// COLLABORATOR CONTRACT
// ============================================================================

/// VocabularyLookup - The external vocabulary service
///
/// Implementations must not fail: a miss is `LookupResult::not_found()`.
pub trait VocabularyLookup: Send + Sync {
    fn lookup_by_value(&self, scheme: Scheme, value: &str) -> LookupResult;

    fn lookup_by_id(&self, scheme: Scheme, id: &str) -> LookupResult;

    /// An identifier-based lookup found nothing
    fn report_not_found(&self, key: &str, value: &str);

    /// A value-based lookup rejected the value
    fn report_invalid(&self, key: &str, value: &str);
}

// ============================================================================
// IN-MEMORY TABLE
// ============================================================================

/// One diagnostic: (curie, value)
pub type Report = (String, String);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reports {
    pub not_found: Vec<Report>,
    pub invalid: Vec<Report>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VocabularyFile {
    #[serde(default)]
    by_value: HashMap<Scheme, HashMap<String, LookupResult>>,
    #[serde(default)]
    by_id: HashMap<Scheme, HashMap<String, LookupResult>>,
}

/// One concept per CSV row
#[derive(Debug, Deserialize)]
struct ConceptRow {
    scheme: String,
    #[serde(default)]
    id: String,
    #[serde(default)]
    identifier: String,
    #[serde(default)]
    source: String,
    /// '|'-separated
    #[serde(default)]
    labels: String,
    #[serde(default)]
    language: String,
    #[serde(default, rename = "type")]
    concept_type: String,
    #[serde(default)]
    exact_match: String,
    #[serde(default)]
    uri: String,
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl ConceptRow {
    fn into_concept(self) -> std::result::Result<(Scheme, LookupResult), EnrichError> {
        let scheme: Scheme = self.scheme.trim().parse()?;
        let language = non_empty(self.language);
        let concept_type = match non_empty(self.concept_type) {
            Some(name) => Some(name.parse::<ConceptType>()?),
            None => None,
        };
        let labels = self
            .labels
            .split('|')
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(|text| Label::new(text, language.as_deref()))
            .collect();

        Ok((
            scheme,
            LookupResult {
                id: non_empty(self.id),
                identifier: non_empty(self.identifier),
                source: non_empty(self.source),
                labels,
                exact_match: non_empty(self.exact_match),
                concept_type,
                uri: non_empty(self.uri),
            },
        ))
    }
}

/// VocabularyTable - In-memory vocabulary with collected diagnostics
///
/// Value lookups match the exact key a concept was indexed under: its
/// identifier, each label text, or anything added via `insert_by_value`.
#[derive(Debug, Default)]
pub struct VocabularyTable {
    by_value: HashMap<Scheme, HashMap<String, LookupResult>>,
    by_id: HashMap<Scheme, HashMap<String, LookupResult>>,
    reports: Mutex<Reports>,
}

impl VocabularyTable {
    pub fn new() -> Self {
        VocabularyTable::default()
    }

    /// Load `{"byValue": {scheme: {value: result}}, "byId": {...}}`
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read vocabulary file: {}", path.display()))?;
        let file: VocabularyFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse vocabulary JSON: {}", path.display()))?;

        Ok(VocabularyTable {
            by_value: file.by_value,
            by_id: file.by_id,
            reports: Mutex::new(Reports::default()),
        })
    }

    /// Load one concept per row: `scheme,id,identifier,source,labels,language,type,exact_match,uri`
    pub fn from_csv_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut rdr = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open vocabulary CSV: {}", path.display()))?;

        let mut table = VocabularyTable::new();
        for (line, row) in rdr.deserialize::<ConceptRow>().enumerate() {
            let row = row.with_context(|| format!("Failed to deserialize concept row {}", line + 1))?;
            let (scheme, concept) = row.into_concept().map_err(|err| EnrichError::VocabularyLoad {
                location: format!("{}:{}", path.display(), line + 2),
                reason: err.to_string(),
            })?;
            table.add_concept(scheme, concept);
        }

        tracing::debug!(path = %path.display(), concepts = table.concept_count(), "vocabulary loaded");
        Ok(table)
    }

    /// Pick the loader from the file extension (`.csv`, otherwise JSON)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => VocabularyTable::from_csv_file(path),
            _ => VocabularyTable::from_json_file(path),
        }
    }

    /// Index a concept under its id, and by value under identifier and labels
    pub fn add_concept(&mut self, scheme: Scheme, concept: LookupResult) {
        let mut keys: Vec<String> = concept.identifier.iter().cloned().collect();
        keys.extend(concept.labels.iter().map(|label| label.text.clone()));
        for key in keys {
            self.insert_by_value(scheme, key, concept.clone());
        }
        if let Some(id) = concept.id.clone() {
            self.insert_by_id(scheme, id, concept);
        }
    }

    pub fn insert_by_value(&mut self, scheme: Scheme, value: impl Into<String>, result: LookupResult) {
        self.by_value.entry(scheme).or_default().insert(value.into(), result);
    }

    pub fn insert_by_id(&mut self, scheme: Scheme, id: impl Into<String>, result: LookupResult) {
        self.by_id.entry(scheme).or_default().insert(id.into(), result);
    }

    pub fn with_value(mut self, scheme: Scheme, value: &str, result: LookupResult) -> Self {
        self.insert_by_value(scheme, value, result);
        self
    }

    pub fn with_id(mut self, scheme: Scheme, id: &str, result: LookupResult) -> Self {
        self.insert_by_id(scheme, id, result);
        self
    }

    /// Distinct concepts reachable by id
    pub fn concept_count(&self) -> usize {
        self.by_id.values().map(HashMap::len).sum()
    }

    fn reports(&self) -> MutexGuard<'_, Reports> {
        // A panic elsewhere must not hide diagnostics already collected
        self.reports.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn not_found(&self) -> Vec<Report> {
        self.reports().not_found.clone()
    }

    pub fn invalid(&self) -> Vec<Report> {
        self.reports().invalid.clone()
    }

    /// Drain collected diagnostics
    pub fn take_reports(&self) -> Reports {
        std::mem::take(&mut *self.reports())
    }

    fn find(
        index: &HashMap<Scheme, HashMap<String, LookupResult>>,
        scheme: Scheme,
        key: &str,
    ) -> LookupResult {
        index
            .get(&scheme)
            .and_then(|entries| entries.get(key))
            .cloned()
            .unwrap_or_default()
    }
}

impl VocabularyLookup for VocabularyTable {
    fn lookup_by_value(&self, scheme: Scheme, value: &str) -> LookupResult {
        VocabularyTable::find(&self.by_value, scheme, value)
    }

    fn lookup_by_id(&self, scheme: Scheme, id: &str) -> LookupResult {
        VocabularyTable::find(&self.by_id, scheme, id)
    }

    fn report_not_found(&self, key: &str, value: &str) {
        tracing::debug!(key, value, "not found");
        self.reports().not_found.push((key.to_string(), value.to_string()));
    }

    fn report_invalid(&self, key: &str, value: &str) {
        tracing::debug!(key, value, "invalid");
        self.reports().invalid.push((key.to_string(), value.to_string()));
    }
}

// ============================================================================
// TESTS
// ============================================================================
