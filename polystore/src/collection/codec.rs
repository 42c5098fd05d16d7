//! Converts between the in-memory [Document] representation and the text
//! blob form persisted by the emulation backend.
//!
//! Encoding serializes timestamps to RFC 3339 text inside a plain JSON
//! object. Decoding re-hydrates the top-level `created_at` / `updated_at`
//! fields back into timestamps by name; any other field keeps the type the
//! JSON parser produced. The name-based reconstruction is a convention of
//! the data model (no non-temporal field uses one of those names), chosen
//! over a self-describing type envelope.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::collection::Document;
use crate::common::{Value, TEMPORAL_FIELDS};
use crate::errors::{ErrorKind, StoreError, StoreResult};

/// Encodes a document into its persisted blob form.
pub fn encode(document: &Document) -> StoreResult<String> {
    let json = document_to_json(document);
    Ok(serde_json::to_string(&json)?)
}

/// Decodes a persisted blob back into a document.
///
/// A temporal field whose text does not parse as a timestamp stays plain
/// text rather than failing the whole decode. A blob that is not a JSON
/// object at all is a hard [ErrorKind::EncodingError]: that is storage
/// corruption, not a soft miss.
pub fn decode(blob: &str) -> StoreResult<Document> {
    let json: serde_json::Value = serde_json::from_str(blob)?;
    let serde_json::Value::Object(map) = json else {
        return Err(StoreError::new(
            "stored blob is not a JSON object",
            ErrorKind::EncodingError,
        ));
    };

    let mut document = Document::new();
    for (key, value) in map {
        document.put(&key, json_to_value(value))?;
    }

    for field in TEMPORAL_FIELDS {
        let parsed = match document.get(field) {
            Some(Value::String(text)) => DateTime::parse_from_rfc3339(text).ok(),
            _ => None,
        };
        // an unparsable temporal field stays as plain text
        if let Some(timestamp) = parsed {
            document.put(field, timestamp.with_timezone(&Utc))?;
        }
    }

    Ok(document)
}

fn document_to_json(document: &Document) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for (key, value) in document.iter() {
        map.insert(key.clone(), value_to_json(value));
    }
    serde_json::Value::Object(map)
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::I64(i) => serde_json::Value::Number((*i).into()),
        Value::F64(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::DateTime(dt) => {
            serde_json::Value::String(dt.to_rfc3339_opts(SecondsFormat::Micros, true))
        }
        Value::Array(values) => {
            serde_json::Value::Array(values.iter().map(value_to_json).collect())
        }
        Value::Document(document) => document_to_json(document),
    }
}

fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::I64(i),
            None => Value::F64(n.as_f64().unwrap_or_default()),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(values) => {
            Value::Array(values.into_iter().map(json_to_value).collect())
        }
        serde_json::Value::Object(map) => {
            let mut document = Document::new();
            for (key, value) in map {
                // keys inside a stored blob were validated on the way in
                let _ = document.put(&key, json_to_value(value));
            }
            Value::Document(document)
        }
    }
}
