//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between the
//! dialogue engine and the outside world. Adapters implement these ports.
//!
//! - `ValidationOracle` - natural-language judgment of one answer at a time
//! - `DateResolver` - free-form date expression to calendar date
//! - `PhoneValidator` - free-form phone string to canonical parts

mod date_resolver;
mod oracle;
mod phone_validator;

pub use date_resolver::{DateResolveError, DateResolver};
pub use oracle::{OracleError, ValidationOracle, ValidationRequest, ValidationVerdict};
pub use phone_validator::{ParsedPhone, PhoneError, PhoneValidator};
