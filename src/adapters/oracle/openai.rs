//! OpenAI-compatible validation oracle.
//!
//! Talks to any chat-completions endpoint that speaks the OpenAI wire format,
//! including a local Ollama instance (the default). The model is asked to
//! answer with a single JSON object carrying the verdict; anything else is a
//! parse error, which the resilience wrapper treats as retryable.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::ports::{OracleError, ValidationOracle, ValidationRequest, ValidationVerdict};

/// Configuration for the OpenAI-compatible oracle.
#[derive(Debug, Clone)]
pub struct OpenAiOracleConfig {
    /// API key for authentication. Ollama accepts any value.
    api_key: Secret<String>,
    /// Model to use (e.g. "llama3.1:8b", "gpt-4o-mini").
    pub model: String,
    /// Base URL of the API (default: local Ollama).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl OpenAiOracleConfig {
    /// Creates a configuration with the given API key and local defaults.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "llama3.1:8b".to_string(),
            base_url: "http://localhost:11434/v1".to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Validation oracle backed by an OpenAI-compatible chat-completions API.
pub struct OpenAiOracle {
    config: OpenAiOracleConfig,
    client: Client,
}

impl OpenAiOracle {
    /// Creates a new oracle with the given configuration.
    pub fn new(config: OpenAiOracleConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    /// Builds the system prompt instructing the model to judge one field.
    fn system_prompt(request: &ValidationRequest) -> String {
        format!(
            "You are an expert at validating and extracting data for a form.\n\n\
             Follow these instructions:\n\
             1. Judge the user input against the field description and validation rules below.\n\
             2. Put the extracted, cleaned value in 'extracted_value'. If the input is invalid, \
             preserve the user's original content there instead of inventing new content.\n\
             3. If the user input is not valid, write a helpful message in 'error_message' and \
             set 'is_valid' to false. The message should assist the user in providing the \
             proper input.\n\
             4. Empty input is always invalid.\n\
             5. Respond with ONLY a JSON object of the form \
             {{\"is_valid\": true/false, \"extracted_value\": \"...\", \"error_message\": null or \"...\"}}.\n\n\
             Field type: {}\n\
             Description of the user input: {}\n\
             Validation rules of the user input: {}\n\
             Previously collected answers (for consistency checks): {}",
            request.field_type, request.description, request.validation_policy, request.context
        )
    }

    fn to_wire_request(&self, request: &ValidationRequest) -> WireRequest {
        WireRequest {
            model: self.config.model.clone(),
            messages: vec![
                WireMessage {
                    role: "system".to_string(),
                    content: Self::system_prompt(request),
                },
                WireMessage {
                    role: "user".to_string(),
                    content: request.raw_input.clone(),
                },
            ],
            temperature: 0.0,
            response_format: WireResponseFormat {
                format_type: "json_object".to_string(),
            },
        }
    }

    async fn handle_response_status(&self, response: Response) -> Result<Response, OracleError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 => Err(OracleError::AuthenticationFailed),
            429 => Err(OracleError::RateLimited {
                retry_after_secs: 30,
            }),
            400 => Err(OracleError::InvalidRequest(error_body)),
            500..=599 => Err(OracleError::unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(OracleError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    /// Parses the model's JSON answer into a verdict, falling back to the
    /// user's raw input when the model left the extracted value empty on
    /// rejection.
    fn parse_verdict(content: &str, raw_input: &str) -> Result<ValidationVerdict, OracleError> {
        let wire: WireVerdict = serde_json::from_str(content.trim())
            .map_err(|e| OracleError::parse(format!("not a verdict: {} in {:?}", e, content)))?;

        let extracted = match wire.extracted_value {
            Some(value) if !value.is_empty() => value,
            _ => raw_input.to_string(),
        };

        if wire.is_valid {
            Ok(ValidationVerdict::valid(extracted))
        } else {
            let message = wire
                .error_message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "The input doesn't seem correct.".to_string());
            Ok(ValidationVerdict {
                is_valid: false,
                extracted_value: extracted,
                error_message: Some(message),
            })
        }
    }
}

#[async_trait]
impl ValidationOracle for OpenAiOracle {
    async fn validate(&self, request: ValidationRequest) -> Result<ValidationVerdict, OracleError> {
        let wire_request = self.to_wire_request(&request);

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.config.api_key())
            .header("Content-Type", "application/json")
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    OracleError::network(format!("Connection failed: {}", e))
                } else {
                    OracleError::network(e.to_string())
                }
            })?;

        let response = self.handle_response_status(response).await?;

        let completion: WireCompletion = response
            .json()
            .await
            .map_err(|e| OracleError::parse(format!("Failed to parse response: {}", e)))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| OracleError::parse("completion has no choices"))?;

        debug!(model = %self.config.model, "oracle completion received");
        Self::parse_verdict(&content, &request.raw_input)
    }
}

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
    response_format: WireResponseFormat,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct WireResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct WireCompletion {
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct WireChoiceMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct WireVerdict {
    is_valid: bool,
    #[serde(default)]
    extracted_value: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}
