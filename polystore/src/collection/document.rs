use indexmap::IndexMap;
use uuid::Uuid;

use crate::common::{Value, DOC_ID};
use crate::errors::{ErrorKind, StoreError, StoreResult};
use std::fmt::{Debug, Display, Formatter};

/// Represents a single record in a collection.
///
/// A document is an ordered mapping from field name to [Value]. Field order
/// is insertion order and survives the encode/decode round trip.
///
/// Every document has exactly one identity field, `_id`, holding a string
/// unique within its collection. The identity is assigned by the caller or
/// generated (UUID v4) before insertion; see [Document::ensure_id].
///
/// # Examples
///
/// ```ignore
/// let mut doc = Document::new();
/// doc.put("title", "Tomato seeds")?;
/// doc.put("price", 150)?;
/// assert_eq!(doc.get("price"), Some(&Value::I64(150)));
/// ```
#[derive(Clone, Default, PartialEq)]
pub struct Document {
    fields: IndexMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Document {
            fields: IndexMap::new(),
        }
    }

    /// Checks if the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the number of fields in the document.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Associates a value with a field name, replacing any prior value.
    ///
    /// # Errors
    ///
    /// * [ErrorKind::InvalidFieldName] if the key is empty
    /// * [ErrorKind::InvalidId] if the key is `_id` and the value is not a
    ///   string
    pub fn put(&mut self, key: &str, value: impl Into<Value>) -> StoreResult<()> {
        if key.is_empty() {
            return Err(StoreError::new(
                "field name cannot be empty",
                ErrorKind::InvalidFieldName,
            ));
        }
        let value = value.into();
        if key == DOC_ID && !matches!(value, Value::String(_)) {
            return Err(StoreError::new(
                "the _id field must be a string",
                ErrorKind::InvalidId,
            ));
        }
        self.fields.insert(key.to_string(), value);
        Ok(())
    }

    /// Returns the value of a field, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Removes a field and returns its prior value, if any.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.shift_remove(key)
    }

    /// Checks whether the document has a field with the given name.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Returns the document identity, if assigned.
    pub fn id(&self) -> Option<&str> {
        self.get(DOC_ID).and_then(Value::as_str)
    }

    /// Returns the document identity, generating and storing a UUID v4 when
    /// no identity has been assigned yet. Called before every insertion.
    pub fn ensure_id(&mut self) -> String {
        match self.id() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => {
                let id = Uuid::new_v4().to_string();
                self.fields
                    .insert(DOC_ID.to_string(), Value::String(id.clone()));
                id
            }
        }
    }

    /// Iterates over the fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Returns the field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, value)?;
        }
        write!(f, "}}")
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

/// Creates a [Document] from key/value pairs.
///
/// Keys may be identifiers or string literals; values may be expressions,
/// nested `{ .. }` documents, or `[ .. ]` arrays.
///
/// ```ignore
/// let doc = doc! {
///     "_id": "p1",
///     price: 50,
///     category: "seeds",
///     location: { region: "fergana" },
///     images: ["a.jpg", "b.jpg"],
/// };
/// ```
#[macro_export]
macro_rules! doc {
    () => {
        $crate::collection::Document::new()
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::doc_value;

            let mut doc = $crate::collection::Document::new();
            $(
                doc.put(stringify!($key).trim_matches('"'), $crate::doc_value!($value))
                    .expect("failed to put value in document");
            )*
            doc
        }
    };
}

/// Helper macro to convert values for the `doc!` macro.
/// Handles nested documents, arrays, and expressions.
#[macro_export]
macro_rules! doc_value {
    // match a nested document
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
    };

    // match an array of values
    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    // match an expression (variable, function call, literal, etc.)
    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}
