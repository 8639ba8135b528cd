//! The shared data document.
//!
//! A wizard session owns exactly one [`DataDocument`]: the submission data
//! that field components write, and that conditions, branch expressions, and
//! validation read. Pages never hold a private copy; they receive the
//! document by reference whenever they need it.
//!
//! Values are addressed by dotted paths (`"applicant.address.city"`), where
//! each segment is an object key.
//!
//! # Example
//!
//! ```
//! use horizon_wizard_core::DataDocument;
//! use serde_json::json;
//!
//! let doc = DataDocument::new();
//!
//! // Setting a new value reports a change
//! assert!(doc.set("applicant.name", json!("Ada")).unwrap());
//!
//! // Setting the same value again does not
//! assert!(!doc.set("applicant.name", json!("Ada")).unwrap());
//!
//! assert_eq!(doc.get("applicant.name"), Some(json!("Ada")));
//! ```

use std::fmt;

use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::error::{DocumentError, DocumentResult};

/// Look up a dotted path inside a JSON value.
///
/// An empty path resolves to the value itself.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    path.split('.')
        .try_fold(value, |current, segment| current.as_object()?.get(segment))
}

/// Human-readable name of a JSON value's kind, for error messages.
fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A lock-protected JSON document with change detection.
///
/// Writes compare the new value with the current one and report whether
/// anything actually changed, so callers only trigger dependent work (such as
/// a page rebuild) on a real change.
///
/// # Thread Safety
///
/// `DataDocument` uses interior mutability with `RwLock` and is `Send + Sync`.
pub struct DataDocument {
    value: RwLock<Value>,
}

impl DataDocument {
    /// Create an empty document (`{}`).
    pub fn new() -> Self {
        Self {
            value: RwLock::new(Value::Object(Map::new())),
        }
    }

    /// Create a document from existing data.
    ///
    /// The root must be a JSON object; `null` is accepted as an empty object.
    pub fn from_value(value: Value) -> DocumentResult<Self> {
        let value = match value {
            Value::Null => Value::Object(Map::new()),
            Value::Object(_) => value,
            other => {
                return Err(DocumentError::InvalidRoot {
                    kind: kind_of(&other),
                });
            }
        };
        Ok(Self {
            value: RwLock::new(value),
        })
    }

    /// Get a clone of the value at `path`.
    pub fn get(&self, path: &str) -> Option<Value> {
        lookup(&self.value.read(), path).cloned()
    }

    /// Access the whole document through a closure without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Value) -> R,
    {
        f(&self.value.read())
    }

    /// Clone the whole document.
    pub fn snapshot(&self) -> Value {
        self.value.read().clone()
    }

    /// Set the value at `path`, returning `true` if the document changed.
    ///
    /// Missing intermediate objects are created. Writing through a segment
    /// that holds a non-object value is an error.
    pub fn set(&self, path: &str, value: Value) -> DocumentResult<bool> {
        if path.is_empty() || path.split('.').any(str::is_empty) {
            return Err(DocumentError::invalid_path(path));
        }

        let mut root = self.value.write();
        let mut segments = path.split('.').peekable();
        let mut current = &mut *root;

        while let Some(segment) = segments.next() {
            let map = current
                .as_object_mut()
                .ok_or_else(|| DocumentError::not_an_object(path, segment))?;

            if segments.peek().is_none() {
                if map.get(segment) == Some(&value) {
                    return Ok(false);
                }
                map.insert(segment.to_string(), value);
                tracing::trace!(
                    target: "horizon_wizard_core::document",
                    path,
                    "document value changed"
                );
                return Ok(true);
            }

            current = map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }

        Err(DocumentError::invalid_path(path))
    }

    /// Replace the whole document, returning `true` if it changed.
    pub fn replace(&self, value: Value) -> DocumentResult<bool> {
        let value = match value {
            Value::Null => Value::Object(Map::new()),
            Value::Object(_) => value,
            other => {
                return Err(DocumentError::InvalidRoot {
                    kind: kind_of(&other),
                });
            }
        };

        let mut current = self.value.write();
        if *current == value {
            return Ok(false);
        }
        *current = value;
        tracing::debug!(target: "horizon_wizard_core::document", "document replaced");
        Ok(true)
    }
}

impl Default for DataDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DataDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataDocument")
            .field("value", &*self.value.read())
            .finish()
    }
}
