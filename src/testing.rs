// 🧪 Test fixtures - Compact JSON-LD written with curies

use serde_json::Value;

use crate::ns::{DCTERMS, LOM, SCHEMA};
use crate::value::Record;

const PREFIXES: [(&str, &str); 3] = [("schema:", SCHEMA), ("lom:", LOM), ("dcterms:", DCTERMS)];

fn expand(name: &str) -> String {
    PREFIXES
        .iter()
        .find_map(|(short, long)| name.strip_prefix(short).map(|rest| format!("{long}{rest}")))
        .unwrap_or_else(|| name.to_string())
}

/// Expand curie keys and `@type` entries, recursively
pub fn expanded(value: Value) -> Value {
    match value {
        Value::Object(node) => Value::Object(
            node.into_iter()
                .map(|(key, value)| {
                    let value = if key == "@type" {
                        match value {
                            Value::Array(types) => Value::Array(
                                types
                                    .into_iter()
                                    .map(|t| match t {
                                        Value::String(s) => Value::String(expand(&s)),
                                        other => other,
                                    })
                                    .collect(),
                            ),
                            Value::String(s) => Value::String(expand(&s)),
                            other => other,
                        }
                    } else {
                        expanded(value)
                    };
                    (expand(&key), value)
                })
                .collect(),
        ),
        Value::Array(values) => Value::Array(values.into_iter().map(expanded).collect()),
        other => other,
    }
}

/// A record from a curie-keyed `json!` fixture
pub fn record(value: Value) -> Record {
    match expanded(value) {
        Value::Object(node) => node,
        other => panic!("fixture is not an object: {other}"),
    }
}
