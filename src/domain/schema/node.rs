//! Form schema tree.
//!
//! A schema is a tree whose internal nodes are named groups and whose leaves
//! are field definitions. Child order is an explicit list and defines the
//! interview order; it is never an accident of a container type.

use serde::{Deserialize, Serialize};

use super::field::FieldType;

/// The full form schema as loaded from configuration or defined in code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    /// Human name of the form (e.g. "Letter of Guarantee").
    pub name: String,
    /// One-line description of what the form is for.
    pub description: String,
    /// Top-level nodes in interview order.
    pub children: Vec<SchemaNode>,
}

impl FormSchema {
    /// Loads a schema from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }
}

/// One node of the schema tree: a named group or a leaf field.
///
/// The two shapes are structurally distinct (`children` versus `prompt`),
/// so serde's untagged representation resolves them without marker keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaNode {
    /// A named collection of sub-fields, in interview order.
    Group {
        /// Key of this group in the nested result.
        key: String,
        /// Child nodes in interview order.
        children: Vec<SchemaNode>,
    },
    /// A single question.
    Field {
        /// Key of this field in the nested result.
        key: String,
        /// Question text shown to the user.
        prompt: String,
        /// Semantic description forwarded to the oracle.
        description: String,
        /// Validation policy text forwarded to the oracle.
        validation_policy: String,
        /// Declared type, selects the normalizer.
        #[serde(default)]
        field_type: FieldType,
    },
}

impl SchemaNode {
    /// Creates a leaf field node.
    pub fn field(
        key: impl Into<String>,
        prompt: impl Into<String>,
        description: impl Into<String>,
        validation_policy: impl Into<String>,
        field_type: FieldType,
    ) -> Self {
        SchemaNode::Field {
            key: key.into(),
            prompt: prompt.into(),
            description: description.into(),
            validation_policy: validation_policy.into(),
            field_type,
        }
    }

    /// Creates a group node.
    pub fn group(key: impl Into<String>, children: Vec<SchemaNode>) -> Self {
        SchemaNode::Group {
            key: key.into(),
            children,
        }
    }

    /// Key of this node, regardless of shape.
    pub fn key(&self) -> &str {
        match self {
            SchemaNode::Group { key, .. } => key,
            SchemaNode::Field { key, .. } => key,
        }
    }
}
