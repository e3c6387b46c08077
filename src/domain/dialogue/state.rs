//! Conversation state.
//!
//! An explicit state struct owned by the controller, so the turn machine is
//! testable without a live oracle. The cursor only ever moves forward; a
//! rejected answer leaves it in place.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::schema::FieldPath;

use super::store::NestedStore;

/// Unique identifier for one conversation, carried through tracing spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(Uuid);

impl ConversationId {
    /// Creates a new random ConversationId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConversationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Mutable per-conversation state: cursor, cumulative attempt counters, and
/// the collected data. Mutated exclusively by the controller.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    cursor: usize,
    attempts: HashMap<String, u32>,
    collected: NestedStore,
}

impl ConversationState {
    /// Fresh state positioned at the first field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current position in the flattened sequence. Equal to the sequence
    /// length once the conversation completes.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Moves the cursor forward. The cursor never decreases.
    pub fn advance_to(&mut self, next: usize) {
        debug_assert!(next >= self.cursor, "cursor must not move backward");
        self.cursor = next;
    }

    /// Cumulative rejected attempts for a field. Never reset.
    pub fn attempts(&self, path: &FieldPath) -> u32 {
        self.attempts.get(&path.to_string()).copied().unwrap_or(0)
    }

    /// Records one rejected attempt and returns the new count.
    pub fn record_rejection(&mut self, path: &FieldPath) -> u32 {
        let count = self.attempts.entry(path.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// The collected data so far.
    pub fn collected(&self) -> &NestedStore {
        &self.collected
    }

    /// Mutable access for the controller's store step.
    pub fn collected_mut(&mut self) -> &mut NestedStore {
        &mut self.collected
    }
}
