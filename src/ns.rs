// 🔖 Namespaces - Predicate IRIs, lookup schemes and curies
// Single source of truth for every long IRI the enrichment rules touch

use crate::error::EnrichError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// NAMESPACES
// ============================================================================

pub const SCHEMA: &str = "https://schema.org/";
pub const DCTERMS: &str = "http://purl.org/dc/terms/";
pub const LOM: &str = "http://ltsc.ieee.org/xsd/LOM#";
pub const PROV: &str = "http://www.w3.org/ns/prov#";
pub const EDUREP_TERMS: &str = "https://purl.edurep.nl/terms/";

/// Short aliases used in diagnostics, applied in this order
const CURIE_PREFIXES: [(&str, &str); 3] = [
    (SCHEMA, "schema:"),
    (DCTERMS, "dcterms:"),
    (LOM, "lom:"),
];

/// Shorten a full predicate IRI for diagnostics.
///
/// Example: "https://schema.org/teaches" → "schema:teaches"
pub fn to_curie(full: &str) -> String {
    CURIE_PREFIXES
        .iter()
        .fold(full.to_string(), |acc, (long, short)| acc.replace(long, short))
}

// ============================================================================
// PREDICATES
// ============================================================================

/// Fully expanded predicate and type IRIs
pub mod p {
    pub const TEACHES: &str = "https://schema.org/teaches";
    pub const EDUCATIONAL_LEVEL: &str = "https://schema.org/educationalLevel";
    pub const EDUCATIONAL_ALIGNMENT: &str = "https://schema.org/educationalAlignment";
    pub const KEYWORDS: &str = "https://schema.org/keywords";

    pub const IN_DEFINED_TERM_SET: &str = "https://schema.org/inDefinedTermSet";
    pub const TERM_CODE: &str = "https://schema.org/termCode";
    pub const EDUCATIONAL_FRAMEWORK: &str = "https://schema.org/educationalFramework";
    pub const TARGET_NAME: &str = "https://schema.org/targetName";
    pub const NAME: &str = "https://schema.org/name";

    pub const AUDIENCE: &str = "https://schema.org/audience";
    pub const AUDIENCE_TYPE: &str = "https://schema.org/audienceType";
    pub const CREATIVE_WORK_STATUS: &str = "https://schema.org/creativeWorkStatus";
    pub const ENCODING_FORMAT: &str = "https://schema.org/encodingFormat";
    pub const INTERACTIVITY_TYPE: &str = "https://schema.org/interactivityType";
    pub const IS_ACCESSIBLE_FOR_FREE: &str = "https://schema.org/isAccessibleForFree";
    pub const LICENSE: &str = "https://schema.org/license";
    pub const COPYRIGHT_NOTICE: &str = "https://schema.org/copyrightNotice";
    pub const LEARNING_RESOURCE_TYPE: &str = "https://schema.org/learningResourceType";
    pub const DATE_MODIFIED: &str = "https://schema.org/dateModified";

    pub const ACCESS_RIGHTS: &str = "http://purl.org/dc/terms/accessRights";

    pub const COST: &str = "http://ltsc.ieee.org/xsd/LOM#cost";
    pub const AGGREGATION_LEVEL: &str = "http://ltsc.ieee.org/xsd/LOM#aggregationLevel";
    pub const COPYRIGHT_AND_OTHER_RESTRICTIONS: &str =
        "http://ltsc.ieee.org/xsd/LOM#copyrightAndOtherRestrictions";

    pub const DEFINED_TERM: &str = "https://schema.org/DefinedTerm";
    pub const ALIGNMENT_OBJECT: &str = "https://schema.org/AlignmentObject";
    pub const AUDIENCE_CLASS: &str = "https://schema.org/Audience";
}

// ============================================================================
// LOOKUP SCHEMES
// ============================================================================

/// Scheme - Named vocabulary namespace queried through the lookup collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Scheme {
    ConceptSet,
    IntendedEndUserRole,
    Status,
    Cost,
    License,
    AccessRights,
    AggregationLevel,
    MimeType,
    InteractivityType,
}

impl Scheme {
    pub const ALL: [Scheme; 9] = [
        Scheme::ConceptSet,
        Scheme::IntendedEndUserRole,
        Scheme::Status,
        Scheme::Cost,
        Scheme::License,
        Scheme::AccessRights,
        Scheme::AggregationLevel,
        Scheme::MimeType,
        Scheme::InteractivityType,
    ];

    /// Well-known scheme name as understood by the lookup service
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::ConceptSet => "urn:edurep:conceptset",
            Scheme::IntendedEndUserRole => "urn:lms:intendedenduserrole",
            Scheme::Status => "urn:lms:status",
            Scheme::Cost => "urn:lms:cost",
            Scheme::License => "urn:lms:license",
            Scheme::AccessRights => "urn:lms:accessrights",
            Scheme::AggregationLevel => "urn:lms:aggregationlevel",
            Scheme::MimeType => "urn:lms:mimetype",
            Scheme::InteractivityType => "urn:lms:interactivitytype",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = EnrichError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scheme::ALL
            .into_iter()
            .find(|scheme| scheme.as_str() == s)
            .ok_or_else(|| EnrichError::UnknownScheme(s.to_string()))
    }
}

impl TryFrom<String> for Scheme {
    type Error = EnrichError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Scheme> for String {
    fn from(scheme: Scheme) -> Self {
        scheme.as_str().to_string()
    }
}

// ============================================================================
// TESTS
// ============================================================================
