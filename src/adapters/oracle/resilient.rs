//! Resilient oracle wrapper.
//!
//! Treats the inner oracle as a potentially slow, potentially failing remote
//! call: retryable failures are retried with exponential backoff up to a
//! bounded count. When retries exhaust (or the failure is not retryable),
//! the wrapper surfaces a terminal invalid verdict with a generic message
//! instead of an error, so the conversation simply re-asks the question.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::warn;

use crate::ports::{OracleError, ValidationOracle, ValidationRequest, ValidationVerdict};

const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Message attached to the terminal verdict when the boundary gives up.
const GIVE_UP_MESSAGE: &str =
    "I could not process that input right now. Could you please try once more?";

/// Bounded-retry wrapper around any [`ValidationOracle`].
pub struct ResilientOracle {
    inner: Arc<dyn ValidationOracle>,
    max_attempts: u32,
    base_delay: Duration,
}

impl ResilientOracle {
    /// Wraps `inner` with the default budget of 5 attempts and 1s base
    /// backoff.
    pub fn new(inner: Arc<dyn ValidationOracle>) -> Self {
        Self {
            inner,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_secs(1),
        }
    }

    /// Sets the total attempt budget (minimum 1).
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Sets the base backoff delay. Tests pass `Duration::ZERO`.
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    fn give_up(&self, raw_input: &str, last_error: &OracleError) -> ValidationVerdict {
        warn!(error = %last_error, "oracle retries exhausted, surfacing terminal verdict");
        ValidationVerdict::invalid(raw_input, GIVE_UP_MESSAGE)
    }
}

#[async_trait]
impl ValidationOracle for ResilientOracle {
    async fn validate(&self, request: ValidationRequest) -> Result<ValidationVerdict, OracleError> {
        let mut attempt = 0;

        loop {
            match self.inner.validate(request.clone()).await {
                Ok(verdict) => return Ok(verdict),
                Err(err) => {
                    attempt += 1;
                    if !err.is_retryable() || attempt >= self.max_attempts {
                        return Ok(self.give_up(&request.raw_input, &err));
                    }
                    warn!(error = %err, attempt, "oracle call failed, retrying");
                    // Exponential backoff: base, 2x, 4x, ...
                    if !self.base_delay.is_zero() {
                        sleep(self.base_delay * (1 << (attempt - 1))).await;
                    }
                }
            }
        }
    }
}
