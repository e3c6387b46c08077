//! Dialogue module.
//!
//! Owns the conversation: per-conversation state, the nested result store,
//! the dependent-field skip rules, and the turn-driving controller.

mod controller;
mod skip;
mod state;
mod store;

pub use controller::{DialogueController, DialogueError, TurnOutcome};
pub use skip::{SkipRule, SkipRuleSet, SkipTrigger};
pub use state::{ConversationId, ConversationState};
pub use store::{NestedStore, StoreError};
