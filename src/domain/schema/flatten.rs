//! Schema flattening.
//!
//! Walks the schema tree depth-first in declaration order and produces the
//! ordered sequence of leaf fields that drives the conversation. Position in
//! this sequence is load-bearing: skip rules are expressed as "bypass the
//! next N entries", so the order must be deterministic across calls.

use std::collections::HashSet;

use thiserror::Error;

use super::field::{FieldPath, FieldSpec};
use super::node::{FormSchema, SchemaNode};

/// Errors detected while flattening a schema. All are fatal at construction
/// time; the engine refuses to start a conversation on a malformed schema.
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    #[error("schema '{name}' contains no fields")]
    EmptySchema { name: String },

    #[error("duplicate field path '{path}'")]
    DuplicatePath { path: String },
}

/// The ordered, immutable sequence of leaf fields for one schema.
#[derive(Debug, Clone, PartialEq)]
pub struct FlattenedSequence {
    fields: Vec<FieldSpec>,
}

impl FlattenedSequence {
    /// Number of leaf fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the sequence holds no fields. Never observable through the
    /// public constructor, which rejects empty schemas.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The field at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&FieldSpec> {
        self.fields.get(index)
    }

    /// Iterates the fields in interview order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter()
    }
}

/// Flattens a schema into its interview sequence.
///
/// Depth-first, group before siblings, preserving declared child order.
/// Two calls on an identical schema produce an identical sequence.
pub fn flatten(schema: &FormSchema) -> Result<FlattenedSequence, SchemaError> {
    let mut fields = Vec::new();
    let mut seen = HashSet::new();

    walk(&schema.children, &mut Vec::new(), &mut fields, &mut seen)?;

    if fields.is_empty() {
        return Err(SchemaError::EmptySchema {
            name: schema.name.clone(),
        });
    }

    Ok(FlattenedSequence { fields })
}

fn walk(
    nodes: &[SchemaNode],
    prefix: &mut Vec<String>,
    out: &mut Vec<FieldSpec>,
    seen: &mut HashSet<String>,
) -> Result<(), SchemaError> {
    for node in nodes {
        match node {
            SchemaNode::Group { key, children } => {
                prefix.push(key.clone());
                walk(children, prefix, out, seen)?;
                prefix.pop();
            }
            SchemaNode::Field {
                key,
                prompt,
                description,
                validation_policy,
                field_type,
            } => {
                let mut segments = prefix.clone();
                segments.push(key.clone());
                let path = FieldPath::new(segments);

                if !seen.insert(path.to_string()) {
                    return Err(SchemaError::DuplicatePath {
                        path: path.to_string(),
                    });
                }

                out.push(FieldSpec {
                    path,
                    prompt: prompt.clone(),
                    description: description.clone(),
                    validation_policy: validation_policy.clone(),
                    field_type: *field_type,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::FieldType;

    fn field(key: &str) -> SchemaNode {
        SchemaNode::field(key, format!("{}?", key), key, "", FieldType::PlainText)
    }

    fn schema(children: Vec<SchemaNode>) -> FormSchema {
        FormSchema {
            name: "Test".to_string(),
            description: "test".to_string(),
            children,
        }
    }

    #[test]
    fn flatten_preserves_declaration_order() {
        let s = schema(vec![
            field("date"),
            field("name"),
            SchemaNode::group("guarantor", vec![field("name"), field("phone")]),
            field("signature"),
        ]);

        let seq = flatten(&s).unwrap();
        let paths: Vec<String> = seq.iter().map(|f| f.path.to_string()).collect();
        assert_eq!(
            paths,
            vec![
                "date",
                "name",
                "guarantor.name",
                "guarantor.phone",
                "signature"
            ]
        );
    }

    #[test]
    fn flatten_counts_all_leaves() {
        let s = schema(vec![
            field("a"),
            SchemaNode::group(
                "g",
                vec![field("b"), SchemaNode::group("h", vec![field("c")])],
            ),
        ]);

        let seq = flatten(&s).unwrap();
        assert_eq!(seq.len(), 3);
    }

    #[test]
    fn flatten_is_deterministic() {
        let s = schema(vec![
            field("a"),
            SchemaNode::group("g", vec![field("b"), field("c")]),
        ]);

        let first = flatten(&s).unwrap();
        let second = flatten(&s).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn flatten_rejects_empty_schema() {
        let s = schema(vec![]);
        assert!(matches!(flatten(&s), Err(SchemaError::EmptySchema { .. })));
    }

    #[test]
    fn flatten_rejects_schema_with_only_empty_groups() {
        let s = schema(vec![SchemaNode::group("g", vec![])]);
        assert!(matches!(flatten(&s), Err(SchemaError::EmptySchema { .. })));
    }

    #[test]
    fn flatten_rejects_duplicate_paths() {
        let s = schema(vec![field("a"), field("a")]);
        match flatten(&s) {
            Err(SchemaError::DuplicatePath { path }) => assert_eq!(path, "a"),
            other => panic!("expected duplicate path error, got {:?}", other),
        }
    }

    #[test]
    fn same_leaf_key_in_different_groups_is_allowed() {
        let s = schema(vec![
            field("name"),
            SchemaNode::group("guarantor", vec![field("name")]),
        ]);
        let seq = flatten(&s).unwrap();
        assert_eq!(seq.len(), 2);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;
        use std::collections::HashSet;

        /// Tree shape without keys; keys are assigned per sibling index when
        /// the shape is turned into nodes, so sibling keys never collide.
        #[derive(Debug, Clone)]
        enum Shape {
            Leaf,
            Group(Vec<Shape>),
        }

        fn arb_shape() -> impl Strategy<Value = Shape> {
            Just(Shape::Leaf).prop_recursive(3, 24, 4, |inner| {
                prop::collection::vec(inner, 1..4).prop_map(Shape::Group)
            })
        }

        fn to_nodes(shapes: &[Shape]) -> Vec<SchemaNode> {
            shapes
                .iter()
                .enumerate()
                .map(|(i, shape)| match shape {
                    Shape::Leaf => field(&format!("k{}", i)),
                    Shape::Group(children) => {
                        SchemaNode::group(format!("k{}", i), to_nodes(children))
                    }
                })
                .collect()
        }

        fn leaf_count(shapes: &[Shape]) -> usize {
            shapes
                .iter()
                .map(|shape| match shape {
                    Shape::Leaf => 1,
                    Shape::Group(children) => leaf_count(children),
                })
                .sum()
        }

        proptest! {
            #[test]
            fn flatten_emits_every_leaf_exactly_once(
                shapes in prop::collection::vec(arb_shape(), 1..4)
            ) {
                let s = schema(to_nodes(&shapes));
                let seq = flatten(&s).unwrap();
                prop_assert_eq!(seq.len(), leaf_count(&shapes));

                let paths: HashSet<String> =
                    seq.iter().map(|f| f.path.to_string()).collect();
                prop_assert_eq!(paths.len(), seq.len(), "paths must be unique");
            }

            #[test]
            fn flatten_is_deterministic_for_any_tree(
                shapes in prop::collection::vec(arb_shape(), 1..4)
            ) {
                let s = schema(to_nodes(&shapes));
                prop_assert_eq!(flatten(&s).unwrap(), flatten(&s).unwrap());
            }
        }
    }
}
