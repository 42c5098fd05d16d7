use indexmap::IndexMap;

use crate::collection::Document;
use crate::common::Value;
use crate::errors::{ErrorKind, StoreError, StoreResult};

/// A declarative set of field mutations applied to one document.
///
/// The modifier surface is typed and closed: `$set`, `$inc`, and `$push`
/// are the modifiers both backends honor, and nothing else can be
/// expressed. This makes the capability boundary a compile-time property
/// instead of a modifier that silently no-ops on one backend.
///
/// Applying an update always rewrites the whole stored document; there is
/// no partial-column update.
///
/// ```ignore
/// let update = Update::new()
///     .set("status", "sold")
///     .inc("views", 1)
///     .push("images", "c.jpg");
/// ```
#[derive(Clone, Debug, Default)]
pub struct Update {
    pub(crate) set: IndexMap<String, Value>,
    pub(crate) inc: IndexMap<String, Value>,
    pub(crate) push: IndexMap<String, Value>,
}

impl Update {
    /// Creates an empty update.
    pub fn new() -> Self {
        Update::default()
    }

    /// Overwrites or adds a field verbatim (`$set`).
    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.set.insert(field.to_string(), value.into());
        self
    }

    /// Adds a numeric delta to a field (`$inc`), treating an absent field
    /// as 0.
    pub fn inc(mut self, field: &str, delta: impl Into<Value>) -> Self {
        self.inc.insert(field.to_string(), delta.into());
        self
    }

    /// Appends a value to an array field (`$push`), creating the array
    /// when the field is absent.
    pub fn push(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.push.insert(field.to_string(), value.into());
        self
    }

    /// Checks if the update carries no modifiers.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.inc.is_empty() && self.push.is_empty()
    }

    /// Applies the update to a document in memory, returning the rewritten
    /// document. The input is never partially modified: the caller either
    /// persists the returned document in full or persists nothing.
    ///
    /// # Errors
    ///
    /// [ErrorKind::UnsupportedModifier] when `$inc` targets a non-numeric
    /// delta or field, or `$push` targets a non-array field. A modifier
    /// that cannot be honored is rejected, never silently ignored, to
    /// avoid masking lost writes.
    pub fn apply(&self, document: &Document) -> StoreResult<Document> {
        let mut updated = document.clone();

        for (field, value) in &self.set {
            updated.put(field, value.clone())?;
        }

        for (field, delta) in &self.inc {
            let current = updated.get(field).cloned().unwrap_or(Value::I64(0));
            updated.put(field, add_numeric(field, &current, delta)?)?;
        }

        for (field, value) in &self.push {
            match updated.get(field) {
                None | Some(Value::Null) => {
                    updated.put(field, Value::Array(vec![value.clone()]))?;
                }
                Some(Value::Array(elements)) => {
                    let mut elements = elements.clone();
                    elements.push(value.clone());
                    updated.put(field, Value::Array(elements))?;
                }
                Some(other) => {
                    return Err(StoreError::new(
                        &format!("cannot $push to non-array field {}: {}", field, other),
                        ErrorKind::UnsupportedModifier,
                    ));
                }
            }
        }

        Ok(updated)
    }
}

/// Integer deltas on integer fields stay integers; any float widens the
/// result to a float.
fn add_numeric(field: &str, current: &Value, delta: &Value) -> StoreResult<Value> {
    match (current, delta) {
        (Value::I64(a), Value::I64(b)) => Ok(Value::I64(a.wrapping_add(*b))),
        (a, b) if a.is_number() && b.is_number() => Ok(Value::F64(
            a.as_f64().unwrap_or_default() + b.as_f64().unwrap_or_default(),
        )),
        _ => Err(StoreError::new(
            &format!("cannot $inc non-numeric field {}", field),
            ErrorKind::UnsupportedModifier,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    #[test]
    fn test_set_overwrites_and_adds() {
        let doc = doc! { "_id": "p1", status: "active" };
        let updated = Update::new()
            .set("status", "sold")
            .set("buyer", "u1")
            .apply(&doc)
            .unwrap();
        assert_eq!(updated.get("status"), Some(&Value::from("sold")));
        assert_eq!(updated.get("buyer"), Some(&Value::from("u1")));
        // the input document is untouched
        assert_eq!(doc.get("status"), Some(&Value::from("active")));
    }

    #[test]
    fn test_inc_adds_delta() {
        let doc = doc! { "_id": "p1", views: 10 };
        let updated = Update::new().inc("views", 5).apply(&doc).unwrap();
        assert_eq!(updated.get("views"), Some(&Value::I64(15)));
    }

    #[test]
    fn test_inc_missing_field_starts_at_zero() {
        let updated = Update::new().inc("views", 3).apply(&doc! {}).unwrap();
        assert_eq!(updated.get("views"), Some(&Value::I64(3)));
    }

    #[test]
    fn test_inc_integer_fields_stay_integers() {
        let updated = Update::new().inc("views", 1).apply(&doc! { views: 1 }).unwrap();
        assert!(matches!(updated.get("views"), Some(Value::I64(2))));

        let updated = Update::new().inc("score", 0.5).apply(&doc! { score: 1 }).unwrap();
        assert_eq!(updated.get("score"), Some(&Value::F64(1.5)));
    }

    #[test]
    fn test_inc_non_numeric_field_rejected() {
        let err = Update::new()
            .inc("title", 1)
            .apply(&doc! { title: "x" })
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnsupportedModifier);
    }

    #[test]
    fn test_push_appends_and_creates() {
        let updated = Update::new()
            .push("images", "b.jpg")
            .apply(&doc! { images: ["a.jpg"] })
            .unwrap();
        let images = updated.get("images").and_then(Value::as_array).unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[1], Value::from("b.jpg"));

        let updated = Update::new().push("images", "a.jpg").apply(&doc! {}).unwrap();
        let images = updated.get("images").and_then(Value::as_array).unwrap();
        assert_eq!(images.len(), 1);
    }

    #[test]
    fn test_push_to_non_array_rejected() {
        let err = Update::new()
            .push("title", "x")
            .apply(&doc! { title: "y" })
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnsupportedModifier);
    }

    #[test]
    fn test_empty_update_is_identity() {
        let doc = doc! { a: 1 };
        let update = Update::new();
        assert!(update.is_empty());
        assert_eq!(update.apply(&doc).unwrap(), doc);
    }
}
