//! Phone validation port.

use thiserror::Error;

/// Parses a free-form phone string into its canonical parts. Every error
/// variant carries the originally supplied input, unchanged, so user-facing
/// messages never alter the digits the user typed.
pub trait PhoneValidator: Send + Sync {
    fn parse(&self, input: &str) -> Result<ParsedPhone, PhoneError>;
}

/// A successfully parsed phone number, split into its country code and the
/// national significant number (no trunk prefix).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPhone {
    pub country_code: u16,
    pub national_number: String,
}

impl ParsedPhone {
    /// The stored form: `+<code>-<national>`, e.g. `+81-9012345678`.
    pub fn canonical(&self) -> String {
        format!("+{}-{}", self.country_code, self.national_number)
    }
}

#[derive(Debug, Clone, Error)]
pub enum PhoneError {
    #[error("'{input}' contains characters that are not digits or separators")]
    NonNumeric { input: String },

    #[error("'{input}' has neither a country code nor a leading trunk digit")]
    MissingPrefix { input: String },

    #[error("'{input}' has {digits} national digits, expected {min} to {max}")]
    BadLength {
        input: String,
        digits: usize,
        min: usize,
        max: usize,
    },
}

impl PhoneError {
    /// The input as the user typed it.
    pub fn input(&self) -> &str {
        match self {
            PhoneError::NonNumeric { input }
            | PhoneError::MissingPrefix { input }
            | PhoneError::BadLength { input, .. } => input,
        }
    }
}
