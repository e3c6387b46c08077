//! Dependent-field skip rules.
//!
//! After a field is successfully stored, a rule may declare the next N fields
//! in the flattened sequence irrelevant; the controller fills them with the
//! rule's sentinel and fast-forwards the cursor. The rule set is plain data
//! so new dependent-field rules never touch the controller.

use serde::{Deserialize, Serialize};

use crate::domain::schema::{FieldPath, FieldSpec};

/// Predicate over the just-stored, normalized value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipTrigger {
    /// Fires when the stored value equals this string exactly.
    Equals(String),
    /// Fires when the stored value is any of these strings.
    OneOf(Vec<String>),
}

impl SkipTrigger {
    /// True if the trigger fires for `value`.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            SkipTrigger::Equals(expected) => value == expected,
            SkipTrigger::OneOf(options) => options.iter().any(|o| o == value),
        }
    }
}

/// One dependent-field rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipRule {
    /// Path of the field whose stored value is inspected.
    pub field: FieldPath,
    /// Condition on the stored (normalized) value.
    pub trigger: SkipTrigger,
    /// How many subsequent fields to bypass.
    pub bypass: usize,
    /// Value stored for each bypassed field.
    pub sentinel: String,
}

/// The rule table consulted after every successful store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipRuleSet {
    rules: Vec<SkipRule>,
}

impl SkipRuleSet {
    /// Creates a rule set from a list of rules.
    pub fn new(rules: Vec<SkipRule>) -> Self {
        Self { rules }
    }

    /// An empty rule set: every field is always asked.
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns the first rule that fires for this field and value.
    pub fn evaluate(&self, field: &FieldSpec, value: &str) -> Option<&SkipRule> {
        self.rules
            .iter()
            .find(|rule| rule.field == field.path && rule.trigger.matches(value))
    }
}
