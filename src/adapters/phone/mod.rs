//! Phone validation over plain digit rules.
//!
//! Parses by structure alone: strip separators, recognize the country code
//! or trunk prefix, and bound the national number length. The input string is
//! carried through every error verbatim; no digit is ever rewritten.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::ports::{ParsedPhone, PhoneError, PhoneValidator};

const SEPARATORS: &[char] = &[' ', '-', '.', '(', ')', '\u{2010}', '\u{2212}'];

/// Per-region dialing rules.
#[derive(Debug, Clone, Copy)]
struct RegionRules {
    country_code: u16,
    trunk_digit: char,
    min_digits: usize,
    max_digits: usize,
}

const JAPAN_RULES: RegionRules = RegionRules {
    country_code: 81,
    trunk_digit: '0',
    min_digits: 9,
    max_digits: 11,
};

static REGIONS: Lazy<HashMap<&'static str, RegionRules>> = Lazy::new(|| {
    HashMap::from([
        ("JP", JAPAN_RULES),
        (
            "GB",
            RegionRules {
                country_code: 44,
                trunk_digit: '0',
                min_digits: 9,
                max_digits: 10,
            },
        ),
    ])
});

/// Structural phone validator for a single region.
pub struct DigitPhoneValidator {
    rules: RegionRules,
}

impl DigitPhoneValidator {
    /// Japanese dialing rules: country code 81, trunk digit 0, 9 to 11
    /// national digits.
    pub fn japan() -> Self {
        Self { rules: JAPAN_RULES }
    }

    /// Validator for an ISO 3166 region in the built-in table, or `None`
    /// for an unknown region.
    pub fn for_region(region: &str) -> Option<Self> {
        REGIONS.get(region).map(|rules| Self { rules: *rules })
    }
}

impl PhoneValidator for DigitPhoneValidator {
    fn parse(&self, input: &str) -> Result<ParsedPhone, PhoneError> {
        let compact: String = input
            .chars()
            .filter(|c| !SEPARATORS.contains(c))
            .collect();

        let (has_plus, digits) = match compact.strip_prefix('+') {
            Some(rest) => (true, rest),
            None => (false, compact.as_str()),
        };

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(PhoneError::NonNumeric {
                input: input.to_string(),
            });
        }

        let code = self.rules.country_code.to_string();
        let national = if has_plus {
            let rest = digits
                .strip_prefix(code.as_str())
                .ok_or_else(|| PhoneError::MissingPrefix {
                    input: input.to_string(),
                })?;
            // "+81 090..." is a common redundancy: drop the trunk digit too.
            rest.strip_prefix(self.rules.trunk_digit).unwrap_or(rest)
        } else {
            digits
                .strip_prefix(self.rules.trunk_digit)
                .ok_or_else(|| PhoneError::MissingPrefix {
                    input: input.to_string(),
                })?
        };

        if national.len() < self.rules.min_digits || national.len() > self.rules.max_digits {
            return Err(PhoneError::BadLength {
                input: input.to_string(),
                digits: national.len(),
                min: self.rules.min_digits,
                max: self.rules.max_digits,
            });
        }

        Ok(ParsedPhone {
            country_code: self.rules.country_code,
            national_number: national.to_string(),
        })
    }
}
