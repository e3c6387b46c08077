//! Field-type normalizers.
//!
//! Translates an oracle-accepted raw value into the canonical stored form:
//! dates become `YYYY-MM-DD`, phone numbers become `+<code>-<national>`,
//! plain text passes through (country canonicalization is the oracle's duty,
//! driven by the field's validation policy).

use std::sync::Arc;

use thiserror::Error;

use crate::domain::schema::FieldType;
use crate::ports::{DateResolver, PhoneError, PhoneValidator};

/// Normalization failure. User-correctable: the controller surfaces the
/// user-facing message and re-asks the same question.
#[derive(Debug, Clone, Error)]
pub enum NormalizeError {
    #[error("unresolvable date '{input}'")]
    UnresolvableDate { input: String },

    #[error("invalid phone number: {source}")]
    InvalidPhone {
        #[source]
        source: PhoneError,
    },
}

impl NormalizeError {
    /// Corrective text shown verbatim to the user. Phone messages embed the
    /// originally supplied input unchanged: digits are never altered,
    /// dropped, or invented when reporting the problem.
    pub fn user_message(&self) -> String {
        match self {
            NormalizeError::UnresolvableDate { input } => format!(
                "I could not resolve \"{}\" into a calendar date. \
                 A format like 2024-12-17 or \"17 December 2024\" works best.",
                input
            ),
            NormalizeError::InvalidPhone { source } => format!(
                "The phone number provided, {}, is not valid. Please provide a number \
                 starting with a country code like +81 or a leading 0, followed by 9 to 11 digits.",
                source.input()
            ),
        }
    }
}

/// The normalizer set, dispatching on the field's declared type.
#[derive(Clone)]
pub struct Normalizer {
    dates: Arc<dyn DateResolver>,
    phones: Arc<dyn PhoneValidator>,
}

impl Normalizer {
    /// Creates a normalizer over the given resolution boundaries.
    pub fn new(dates: Arc<dyn DateResolver>, phones: Arc<dyn PhoneValidator>) -> Self {
        Self { dates, phones }
    }

    /// Canonicalizes an oracle-accepted value for a field of `field_type`.
    pub fn normalize(&self, field_type: FieldType, value: &str) -> Result<String, NormalizeError> {
        match field_type {
            FieldType::PlainText => Ok(value.to_string()),
            FieldType::Date => {
                let date = self.dates.resolve(value).map_err(|_| {
                    NormalizeError::UnresolvableDate {
                        input: value.to_string(),
                    }
                })?;
                Ok(date.format("%Y-%m-%d").to_string())
            }
            FieldType::PhoneNumber => {
                let phone = self
                    .phones
                    .parse(value)
                    .map_err(|source| NormalizeError::InvalidPhone { source })?;
                Ok(phone.canonical())
            }
        }
    }
}
