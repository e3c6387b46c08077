//! Guarantee Chat - Conversational Form Filling
//!
//! This crate implements a turn-based dialogue engine that walks a user
//! through a nested form schema one question at a time, validating each
//! answer through a language-model oracle and normalizing typed fields
//! before storing them.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
