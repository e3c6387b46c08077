//! Validation oracle configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::oracle::OpenAiOracleConfig;

/// Configuration of the OpenAI-compatible validation oracle.
///
/// Defaults target a local Ollama instance, which accepts any API key.
#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    /// Base URL of the chat-completions API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// API key (any value works for Ollama)
    #[serde(default = "default_api_key")]
    pub api_key: Secret<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum validation attempts per question on boundary failure
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

impl OracleConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Translate into the adapter's configuration.
    pub fn to_adapter_config(&self) -> OpenAiOracleConfig {
        OpenAiOracleConfig::new(self.api_key.expose_secret().clone())
            .with_base_url(self.base_url.clone())
            .with_model(self.model.clone())
            .with_timeout(self.timeout())
    }

    /// Validate oracle configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidOracleUrl);
        }
        if self.model.is_empty() {
            return Err(ValidationError::MissingRequired("ORACLE__MODEL"));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.max_retries == 0 {
            return Err(ValidationError::InvalidRetryCount);
        }
        Ok(())
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key: default_api_key(),
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_model() -> String {
    "llama3.1:8b".to_string()
}

fn default_api_key() -> Secret<String> {
    Secret::new("ollama".to_string())
}

fn default_timeout() -> u64 {
    60
}

fn default_retries() -> u32 {
    5
}
