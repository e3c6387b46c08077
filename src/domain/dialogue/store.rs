//! Nested result store.
//!
//! Accumulates validated, normalized values into a mapping whose structure
//! mirrors the schema's nesting. Intermediate groups are created lazily on
//! first write; leaf values are write-once.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::schema::FieldPath;

/// Errors raised by the store. Both indicate an engine bug rather than bad
/// user input: the controller never writes the same leaf twice and never
/// mixes a group key with a leaf key.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("value for '{path}' already written")]
    AlreadyWritten { path: String },

    #[error("path '{path}' crosses an existing leaf value")]
    LeafInPath { path: String },
}

/// Collected form data, shaped like the schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NestedStore {
    root: Map<String, Value>,
}

impl NestedStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a leaf value, creating ancestor groups as needed.
    pub fn insert(&mut self, path: &FieldPath, value: impl Into<String>) -> Result<(), StoreError> {
        let mut current = &mut self.root;

        for key in path.groups() {
            let entry = current
                .entry(key.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            current = match entry {
                Value::Object(map) => map,
                _ => {
                    return Err(StoreError::LeafInPath {
                        path: path.to_string(),
                    })
                }
            };
        }

        if current.contains_key(path.leaf()) {
            return Err(StoreError::AlreadyWritten {
                path: path.to_string(),
            });
        }

        current.insert(path.leaf().to_string(), Value::String(value.into()));
        Ok(())
    }

    /// Reads a leaf value back, if present.
    pub fn get(&self, path: &FieldPath) -> Option<&str> {
        let mut current = &self.root;
        for key in path.groups() {
            current = current.get(key)?.as_object()?;
        }
        current.get(path.leaf())?.as_str()
    }

    /// True if a value has been written for `path`.
    pub fn contains(&self, path: &FieldPath) -> bool {
        self.get(path).is_some()
    }

    /// The collected data as JSON, structurally identical to the schema.
    pub fn as_json(&self) -> Value {
        Value::Object(self.root.clone())
    }
}
