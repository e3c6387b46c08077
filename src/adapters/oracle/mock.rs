//! Mock validation oracle for testing.
//!
//! Configurable to return queued verdicts or errors in order, with call
//! tracking, so the dialogue state machine is testable without a live
//! interpretation service.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::ports::{OracleError, ValidationOracle, ValidationRequest, ValidationVerdict};

/// One configured mock outcome.
#[derive(Debug)]
enum MockOutcome {
    Verdict(ValidationVerdict),
    Error(OracleError),
}

/// Mock oracle returning pre-configured outcomes in order.
///
/// When the queue is exhausted it returns a valid verdict; with
/// [`MockOracle::with_default_echo`] that verdict echoes the raw input,
/// which is convenient for happy-path conversations.
#[derive(Debug, Clone, Default)]
pub struct MockOracle {
    outcomes: Arc<Mutex<VecDeque<MockOutcome>>>,
    calls: Arc<Mutex<Vec<ValidationRequest>>>,
    echo_when_exhausted: bool,
}

impl MockOracle {
    /// Creates a mock with an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a verdict.
    pub fn with_verdict(self, verdict: ValidationVerdict) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(MockOutcome::Verdict(verdict));
        self
    }

    /// Queues a boundary error.
    pub fn with_error(self, error: OracleError) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(MockOutcome::Error(error));
        self
    }

    /// Once the queue is exhausted, accept every input verbatim.
    pub fn with_default_echo(mut self) -> Self {
        self.echo_when_exhausted = true;
        self
    }

    /// Number of validate calls received.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// All recorded requests, in order.
    pub fn calls(&self) -> Vec<ValidationRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ValidationOracle for MockOracle {
    async fn validate(&self, request: ValidationRequest) -> Result<ValidationVerdict, OracleError> {
        let raw_input = request.raw_input.clone();
        self.calls.lock().unwrap().push(request);

        match self.outcomes.lock().unwrap().pop_front() {
            Some(MockOutcome::Verdict(verdict)) => Ok(verdict),
            Some(MockOutcome::Error(error)) => Err(error),
            None if self.echo_when_exhausted => Ok(ValidationVerdict::valid(raw_input)),
            None => Ok(ValidationVerdict::valid("Mock value")),
        }
    }
}
