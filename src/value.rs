// 🧹 Value Normalizer - Pure helpers over JSON-LD value nodes
// Literals, identifiers and timestamps in their canonical form

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::sync::OnceLock;

use crate::ns::p;

/// A JSON-LD node: predicate (or keyword) → value(s)
pub type Record = Map<String, Value>;

// ============================================================================
// NODE ACCESS
// ============================================================================

/// All values under a predicate (empty when absent or not a list)
pub fn values_of<'a>(node: &'a Record, predicate: &str) -> &'a [Value] {
    match node.get(predicate) {
        Some(Value::Array(values)) => values,
        _ => &[],
    }
}

/// Text of a literal node (`{"@value": "text"}`)
pub fn literal_text(value: &Value) -> Option<&str> {
    value.get("@value").and_then(Value::as_str)
}

/// True for `{"@value": ...}` nodes
pub fn is_literal(value: &Value) -> bool {
    value.get("@value").is_some()
}

/// First literal text under a predicate
pub fn first_value<'a>(node: &'a Record, predicate: &str) -> Option<&'a str> {
    values_of(node, predicate).first().and_then(literal_text)
}

/// True when `@type` is exactly the one-element list `[type_iri]`
pub fn has_exact_type(node: &Record, type_iri: &str) -> bool {
    match node.get("@type") {
        Some(Value::Array(types)) => types.len() == 1 && types[0].as_str() == Some(type_iri),
        _ => false,
    }
}

/// Non-empty `@id` of a node
pub fn node_id(node: &Record) -> Option<&str> {
    node.get("@id").and_then(Value::as_str).filter(|id| !id.is_empty())
}

// ============================================================================
// LITERALS
// ============================================================================

/// Build a literal node, language-tagged when a language is given
pub fn as_literal(value: &str, language: Option<&str>) -> Value {
    let mut literal = Map::new();
    literal.insert("@value".to_string(), Value::String(value.to_string()));
    if let Some(language) = language {
        literal.insert("@language".to_string(), Value::String(language.to_string()));
    }
    Value::Object(literal)
}

/// Drop nodes whose `@value` already occurred, keeping first-seen order.
/// Nodes without `@value` are always kept.
pub fn dedupe_by_value(nodes: Vec<Value>) -> Vec<Value> {
    let mut seen: Vec<Value> = Vec::new();
    let mut result = Vec::with_capacity(nodes.len());
    for node in nodes {
        if let Some(value) = node.get("@value") {
            if seen.contains(value) {
                continue;
            }
            seen.push(value.clone());
        }
        result.push(node);
    }
    result
}

// ============================================================================
// IDENTIFIERS
// ============================================================================

fn absolute_uri_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^[A-Za-z][A-Za-z0-9+.\-]*:[^\s<>"{}|\\^`]*$"#).expect("valid IRI pattern")
    })
}

fn uuid_run_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)[a-f0-9\-]{32,36}").expect("valid uuid pattern"))
}

/// True iff `s` is an absolute IRI (scheme followed by ':')
pub fn is_absolute_uri(s: &str) -> bool {
    absolute_uri_regex().is_match(s)
}

/// Give a term without `@id` a deterministic one: `<termSet>#<code>`.
///
/// Only applies when the code is free text (not itself a URI) and the
/// term set is an absolute URI. A no-op once `@id` is present.
pub fn synthesize_id(mut term: Record) -> Record {
    if term.contains_key("@id") {
        return term;
    }
    let term_set = first_value(&term, p::IN_DEFINED_TERM_SET).map(str::trim);
    let code = first_value(&term, p::TERM_CODE).map(str::trim);

    let (Some(term_set), Some(code)) = (term_set, code) else {
        return term;
    };
    if code.is_empty() || is_absolute_uri(code) || !is_absolute_uri(term_set) {
        return term;
    }

    let separator = if term_set.ends_with('#') || term_set.ends_with('/') { "" } else { "#" };
    let id = format!("{}{}{}", term_set, separator, percent_encode(code));
    term.insert("@id".to_string(), Value::String(id));
    term
}

/// Percent-encode a code for use in an IRI, leaving '/' readable
fn percent_encode(code: &str) -> String {
    urlencoding::encode(code).replace("%2F", "/")
}

/// Rewrite embedded UUIDs (32-36 hex/hyphen run) to canonical hyphenated
/// lowercase form. Any malformed run leaves the whole input unchanged.
pub fn canonicalize_id(s: &str) -> String {
    let mut malformed = false;
    let rewritten = uuid_run_regex().replace_all(s, |caps: &Captures| {
        let run = &caps[0];
        match canonical_uuid(run) {
            Some(canonical) => canonical,
            None => {
                malformed = true;
                run.to_string()
            }
        }
    });
    if malformed {
        s.to_string()
    } else {
        rewritten.into_owned()
    }
}

fn canonical_uuid(run: &str) -> Option<String> {
    let hex: String = run.chars().filter(|c| *c != '-').collect();
    if hex.len() != 32 {
        return None;
    }
    uuid::Uuid::parse_str(&hex)
        .ok()
        .map(|uuid| uuid.hyphenated().to_string())
}

// ============================================================================
// TIMESTAMPS
// ============================================================================

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Normalize a timestamp to `YYYY-MM-DDTHH:MM:SSZ` in UTC.
///
/// Accepts RFC 3339 with any offset, naive datetimes (taken as UTC) and
/// plain dates (midnight UTC).
pub fn normalize_datetime(s: &str) -> Option<String> {
    let s = s.trim();
    let utc: DateTime<Utc> = if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        dt.with_timezone(&Utc)
    } else if let Some(naive) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
    {
        naive.and_utc()
    } else {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()?
            .and_hms_opt(0, 0, 0)?
            .and_utc()
    };
    Some(utc.format("%Y-%m-%dT%H:%M:%SZ").to_string())
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
    fn test_as_literal() {
        assert_eq!(as_literal("aap", None), json!({"@value": "aap"}));
        assert_eq!(
            as_literal("aap", Some("nl")),
            json!({"@value": "aap", "@language": "nl"})
        );
    }

    #[test]
    fn test_dedupe_by_value_keeps_first() {
        let nodes = vec![
            json!({"@value": "a"}),
            json!({"@value": "b"}),
            json!({"@value": "a", "@language": "nl"}),
            json!({"@id": "x"}),
            json!({"@id": "x"}),
        ];
        assert_eq!(
            dedupe_by_value(nodes),
            vec![
                json!({"@value": "a"}),
                json!({"@value": "b"}),
                json!({"@id": "x"}),
                json!({"@id": "x"}),
            ]
        );
    }

    #[test]
    fn test_is_absolute_uri() {
        assert!(is_absolute_uri("uri:like"));
        assert!(is_absolute_uri("http://purl.edustandaard.nl/begrippenkader"));
        assert!(is_absolute_uri("urn:uuid:onderwijs"));
        assert!(!is_absolute_uri("onderwijs"));
        assert!(!is_absolute_uri("TPv1.0.2_anders"));
        assert!(!is_absolute_uri("open opdracht"));
        assert!(!is_absolute_uri("uri:with space"));
    }

    #[test]
    fn test_synthesize_id() {
        let term = record(json!({
            p::IN_DEFINED_TERM_SET: [{"@value": "uri:like"}],
            p::TERM_CODE: [{"@value": "termCode"}],
        }));
        assert_eq!(node_id(&synthesize_id(term)), Some("uri:like#termCode"));

        let term = record(json!({
            p::IN_DEFINED_TERM_SET: [{"@value": "uri:like:with:space:at:end "}],
            p::TERM_CODE: [{"@value": "termCode"}],
        }));
        assert_eq!(
            node_id(&synthesize_id(term)),
            Some("uri:like:with:space:at:end#termCode")
        );
    }

    #[test]
    fn test_synthesize_id_percent_encodes_and_respects_separator() {
        let term = record(json!({
            p::IN_DEFINED_TERM_SET: [{"@value": "http://purl.edustandaard.nl/vdex_learningresourcetype_czp_20060628.xml"}],
            p::TERM_CODE: [{"@value": "open opdracht"}],
        }));
        assert_eq!(
            node_id(&synthesize_id(term)),
            Some("http://purl.edustandaard.nl/vdex_learningresourcetype_czp_20060628.xml#open%20opdracht")
        );

        let term = record(json!({
            p::IN_DEFINED_TERM_SET: [{"@value": "http://example.org/set/"}],
            p::TERM_CODE: [{"@value": "code"}],
        }));
        assert_eq!(node_id(&synthesize_id(term)), Some("http://example.org/set/code"));
    }

    #[test]
    fn test_synthesize_id_leaves_term_alone() {
        let cases = [
            json!({
                p::IN_DEFINED_TERM_SET: [{"@value": "uri:like"}],
                p::TERM_CODE: [{"@value": "uri:like"}],
            }),
            json!({p::IN_DEFINED_TERM_SET: [{"@value": "uri:like"}]}),
            json!({p::TERM_CODE: [{"@value": "termCode"}]}),
            json!({
                p::IN_DEFINED_TERM_SET: [{"@value": "TPv1.0.2_anders"}],
                p::TERM_CODE: [{"@value": "bron"}],
            }),
            json!({
                "@id": "some:id:already",
                p::IN_DEFINED_TERM_SET: [{"@value": "uri:like"}],
                p::TERM_CODE: [{"@value": "termCode"}],
            }),
        ];
        for case in cases {
            let term = record(case);
            assert_eq!(synthesize_id(term.clone()), term);
        }
    }

    #[test]
    fn test_synthesize_id_is_idempotent() {
        let term = record(json!({
            p::IN_DEFINED_TERM_SET: [{"@value": "not:conceptset"}],
            p::TERM_CODE: [{"@value": "onderwijs"}],
        }));
        let once = synthesize_id(term);
        assert_eq!(synthesize_id(once.clone()), once);
    }

    #[test]
    fn test_canonicalize_id() {
        assert_eq!(canonicalize_id("http://uri/no_uuid"), "http://uri/no_uuid");
        assert_eq!(
            canonicalize_id("http://uri/B79AA975CFC24FBB90939B4A2E7B05A6"),
            "http://uri/b79aa975-cfc2-4fbb-9093-9b4a2e7b05a6"
        );
        assert_eq!(
            canonicalize_id("http://uri/b79aa975cfc24fbb90939b4a2e7b05a6"),
            "http://uri/b79aa975-cfc2-4fbb-9093-9b4a2e7b05a6"
        );
        assert_eq!(
            canonicalize_id("http://uri/b79aa975cfc24fbb90939b4a2e7b05a6?ARST"),
            "http://uri/b79aa975-cfc2-4fbb-9093-9b4a2e7b05a6?ARST"
        );
    }

    #[test]
    fn test_canonicalize_id_malformed_is_unchanged() {
        for same in [
            "http://purl.edustandaard.nl/begrippenkader//0a715024-bacd-41ed-9ac8-134be6c03f7",
            "/0a715024-bacd-41ed-9ac8-134be6c03f7",
        ] {
            assert_eq!(canonicalize_id(same), same);
        }
    }

    #[test]
    fn test_normalize_datetime() {
        assert_eq!(normalize_datetime("2023-01-11T12:34:56Z").as_deref(), Some("2023-01-11T12:34:56Z"));
        assert_eq!(normalize_datetime("2023-01-11T12:34:56+00:00").as_deref(), Some("2023-01-11T12:34:56Z"));
        assert_eq!(normalize_datetime("2023-01-11T13:34:56+01:00").as_deref(), Some("2023-01-11T12:34:56Z"));
        assert_eq!(normalize_datetime("2023-01-11").as_deref(), Some("2023-01-11T00:00:00Z"));
        assert_eq!(normalize_datetime("last year"), None);
        assert_eq!(normalize_datetime(""), None);
    }
}
