//! Leaf field value objects.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The declared type of a leaf field, selecting which normalizer runs
/// after the oracle accepts a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    /// Free text: names, countries, relationships, addresses.
    #[default]
    PlainText,
    /// Calendar dates, stored as `YYYY-MM-DD`.
    Date,
    /// Phone numbers, stored as `+<code>-<national>`.
    PhoneNumber,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldType::PlainText => "plain-text",
            FieldType::Date => "date",
            FieldType::PhoneNumber => "phone-number",
        };
        write!(f, "{}", s)
    }
}

/// Location of a leaf field inside the nested schema.
///
/// An ordered, non-empty sequence of group keys ending with the leaf key.
/// Displayed dot-joined (`guarantor.nationality`), kept structured internally
/// so the store can walk it without re-splitting strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Creates a path from its segments. Panics in debug builds if empty;
    /// paths are only built by the flattener, which never produces one.
    pub fn new(segments: Vec<String>) -> Self {
        debug_assert!(!segments.is_empty(), "field path must be non-empty");
        Self(segments)
    }

    /// The top-level segment, used for section-transition detection.
    pub fn top(&self) -> &str {
        &self.0[0]
    }

    /// The leaf segment (last key).
    pub fn leaf(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or_default()
    }

    /// All segments except the leaf (the enclosing groups).
    pub fn groups(&self) -> &[String] {
        &self.0[..self.0.len() - 1]
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl From<&str> for FieldPath {
    fn from(s: &str) -> Self {
        Self::new(s.split('.').map(str::to_string).collect())
    }
}

/// One leaf question, fully located inside the schema.
///
/// Constructed by the flattener; immutable for the life of the conversation.
/// Retry counters live in [`super::super::dialogue::ConversationState`], not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Unique location of this field in the nested schema.
    pub path: FieldPath,
    /// Question text shown to the user.
    pub prompt: String,
    /// Semantic description forwarded to the oracle, not interpreted here.
    pub description: String,
    /// Validation policy text forwarded to the oracle, not interpreted here.
    pub validation_policy: String,
    /// Declared type, selects the normalizer.
    pub field_type: FieldType,
}
