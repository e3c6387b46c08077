//! Validation oracle port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::dialogue::NestedStore;
use crate::domain::schema::{FieldSpec, FieldType};

/// Judges one free-form answer against a field's description and validation
/// policy, returning a verdict rather than an error for bad user input.
/// Errors are reserved for boundary failures (network, auth, malformed
/// responses).
#[async_trait]
pub trait ValidationOracle: Send + Sync {
    async fn validate(&self, request: ValidationRequest) -> Result<ValidationVerdict, OracleError>;
}

/// Everything the oracle needs to judge one answer.
///
/// `context` carries the answers collected so far, so policies that reference
/// earlier fields ("must differ from the applicant's name") can be enforced.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationRequest {
    pub field_type: FieldType,
    pub description: String,
    pub validation_policy: String,
    pub raw_input: String,
    pub context: Value,
}

impl ValidationRequest {
    /// Builds a request for one field from the user's raw answer and the
    /// answers collected so far.
    pub fn for_field(field: &FieldSpec, raw_input: impl Into<String>, collected: &NestedStore) -> Self {
        Self {
            field_type: field.field_type,
            description: field.description.clone(),
            validation_policy: field.validation_policy.clone(),
            raw_input: raw_input.into(),
            context: collected.as_json(),
        }
    }
}

/// The oracle's judgment of one answer.
///
/// On rejection, `extracted_value` preserves the user's original signal
/// rather than an invented replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub is_valid: bool,
    pub extracted_value: String,
    pub error_message: Option<String>,
}

impl ValidationVerdict {
    /// An accepting verdict carrying the extracted, cleaned value.
    pub fn valid(extracted_value: impl Into<String>) -> Self {
        Self {
            is_valid: true,
            extracted_value: extracted_value.into(),
            error_message: None,
        }
    }

    /// A rejecting verdict. `extracted_value` should echo what the user
    /// actually said.
    pub fn invalid(extracted_value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            extracted_value: extracted_value.into(),
            error_message: Some(message.into()),
        }
    }

    /// The corrective message for a rejection, with a generic fallback when
    /// the oracle supplied none.
    pub fn message(&self) -> &str {
        self.error_message
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or("The input doesn't seem correct.")
    }
}

/// Boundary failure talking to the oracle. Never represents a bad user
/// answer; those come back as rejecting verdicts.
#[derive(Debug, Clone, Error)]
pub enum OracleError {
    #[error("Rate limited, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u32 },

    #[error("Oracle service unavailable: {message}")]
    Unavailable { message: String },

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u32 },

    #[error("Failed to parse oracle response: {0}")]
    Parse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl OracleError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Whether a retry could plausibly succeed. Parse failures are retryable:
    /// language models are nondeterministic and may answer well-formed JSON
    /// on the next attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            OracleError::RateLimited { .. }
            | OracleError::Unavailable { .. }
            | OracleError::Network(_)
            | OracleError::Timeout { .. }
            | OracleError::Parse(_) => true,
            OracleError::AuthenticationFailed | OracleError::InvalidRequest(_) => false,
        }
    }
}
