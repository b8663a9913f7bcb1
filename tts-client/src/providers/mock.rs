//! Mock speech provider for testing
//!
//! Plays back a script of outcomes, one per call, and records every text it
//! was asked to synthesize.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Result, TtsError};
use crate::provider::{SpeechProvider, SpeechRequest};

/// Default character limit reported by the mock
pub const MOCK_MAX_INPUT_CHARS: usize = 3000;

/// Scripted result for a single call
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Return the request text's bytes as "audio"
    Echo,
    /// Return these bytes
    Audio(Vec<u8>),
    /// Fail with a transient API error
    Transient(String),
    /// Fail with quota exhaustion
    QuotaExhausted(String),
}

/// A mock provider for exercising the synthesis loop
pub struct MockProvider {
    /// Outcomes still to be played, front first
    script: Mutex<VecDeque<MockOutcome>>,
    /// Outcome used once the script runs out
    fallback: MockOutcome,
    /// Current call count
    call_count: AtomicUsize,
    /// Texts received, in call order
    requests: Mutex<Vec<String>>,
    max_input_chars: usize,
}

impl MockProvider {
    /// Create a provider that plays `script`, then falls back to echoing
    pub fn scripted(script: Vec<MockOutcome>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: MockOutcome::Echo,
            call_count: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            max_input_chars: MOCK_MAX_INPUT_CHARS,
        }
    }

    /// Create a provider that echoes every request back as audio bytes
    pub fn always_succeeds() -> Self {
        Self::scripted(Vec::new())
    }

    /// Create a provider that always fails with the given outcome
    pub fn always_fails(outcome: MockOutcome) -> Self {
        Self {
            fallback: outcome,
            ..Self::scripted(Vec::new())
        }
    }

    pub fn with_max_input_chars(mut self, limit: usize) -> Self {
        self.max_input_chars = limit;
        self
    }

    /// Get the number of times synthesize() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Texts received so far, in call order
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SpeechProvider for MockProvider {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.text.clone());
        }

        let outcome = self
            .script
            .lock()
            .ok()
            .and_then(|mut s| s.pop_front())
            .unwrap_or_else(|| self.fallback.clone());

        match outcome {
            MockOutcome::Echo => Ok(request.text.as_bytes().to_vec()),
            MockOutcome::Audio(bytes) => Ok(bytes),
            MockOutcome::Transient(message) => Err(TtsError::ApiError {
                message,
                status_code: Some(500),
            }),
            MockOutcome::QuotaExhausted(message) => Err(TtsError::QuotaExhausted { message }),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    fn max_input_chars(&self) -> usize {
        self.max_input_chars
    }
}
