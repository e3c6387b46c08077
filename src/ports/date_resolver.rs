//! Date resolution port.

use chrono::NaiveDate;
use thiserror::Error;

/// Resolves a free-form date expression ("next monday", "2024/12/17") into a
/// calendar date. Resolution of relative expressions is anchored to the
/// implementation's notion of "today".
pub trait DateResolver: Send + Sync {
    fn resolve(&self, input: &str) -> Result<NaiveDate, DateResolveError>;
}

#[derive(Debug, Clone, Error)]
pub enum DateResolveError {
    #[error("could not resolve '{input}' into a date")]
    Unresolvable { input: String },
}

impl DateResolveError {
    pub fn unresolvable(input: impl Into<String>) -> Self {
        Self::Unresolvable {
            input: input.into(),
        }
    }
}
