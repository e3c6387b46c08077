//! Form schema module.
//!
//! Defines the nested field schema, its flattening into the interview
//! sequence, and the built-in letter-of-guarantee form.

mod field;
mod flatten;
mod guarantee;
mod node;

pub use field::{FieldPath, FieldSpec, FieldType};
pub use flatten::{flatten, FlattenedSequence, SchemaError};
pub use guarantee::{default_skip_rules, letter_of_guarantee_schema};
pub use node::{FormSchema, SchemaNode};
