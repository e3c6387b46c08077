//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Values are read with the `GUARANTEE_CHAT`
//! prefix and nested keys use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use guarantee_chat::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod error;
mod oracle;

pub use error::{ConfigError, ValidationError};
pub use oracle::OracleConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has working defaults (a local Ollama instance), so the
/// application starts with no environment set at all.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Validation oracle configuration
    #[serde(default)]
    pub oracle: OracleConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads `.env` if present, then reads variables such as
    /// `GUARANTEE_CHAT__ORACLE__MODEL=qwen2.5:14b` into the typed sections.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a value cannot be parsed into its
    /// expected type.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("GUARANTEE_CHAT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.oracle.validate()?;
        Ok(())
    }
}
