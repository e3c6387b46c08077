//! Domain layer containing the dialogue engine's logic and types.
//!
//! # Module Organization
//!
//! - `schema` - field schema tree, flattening, built-in guarantee form
//! - `normalize` - field-type canonicalization (dates, phone numbers)
//! - `dialogue` - conversation state, nested store, skip rules, controller

pub mod dialogue;
pub mod normalize;
pub mod schema;
