/*!
 * Mock backend for testing.
 *
 * This module provides a scripted provider that simulates different behaviors:
 * - `MockProvider::working()` - Always succeeds
 * - `MockProvider::echo()` - Returns the input unchanged (backend no-op)
 * - `MockProvider::failing()` - Always fails with a connection error
 * - `MockProvider::rejecting_source()` - Rejects explicit source codes, accepts auto-detect
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// One recorded call
#[derive(Debug, Clone, PartialEq)]
pub struct MockRequest {
    /// The text to translate
    pub text: String,
    /// Source language, `None` for auto-detection
    pub source_language: Option<String>,
    /// Target language
    pub target_language: String,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a scripted or tagged translation
    Working,
    /// Returns the input unchanged
    Echo,
    /// Always fails with a connection error
    Failing,
    /// Fails with an invalid-language error when a source code is given
    RejectSourceLanguage,
    /// Fails with an invalid-language error on every call
    RejectAllLanguages,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Simulates slow response (for cancellation testing)
    Slow { delay_ms: u64 },
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every request received, in order
    requests: Arc<Mutex<Vec<MockRequest>>>,
    /// Fixed answers by input text
    responses: Arc<HashMap<String, String>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&MockRequest) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            responses: Arc::new(HashMap::new()),
            custom_response: None,
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn rejecting_source() -> Self {
        Self::new(MockBehavior::RejectSourceLanguage)
    }

    pub fn rejecting_all() -> Self {
        Self::new(MockBehavior::RejectAllLanguages)
    }

    /// Answer `input` with `output` whenever the call succeeds
    pub fn with_responses<I, K, V>(mut self, responses: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.responses = Arc::new(
            responses
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&MockRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Copy of every request received so far
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().clone()
    }

    fn answer(&self, request: &MockRequest) -> String {
        if let Some(scripted) = self.responses.get(&request.text) {
            return scripted.clone();
        }
        match self.custom_response {
            Some(generator) => generator(request),
            None => format!("[{}] {}", request.target_language, request.text),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn translate(
        &self,
        text: &str,
        source_language: Option<&str>,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        let request = MockRequest {
            text: text.to_string(),
            source_language: source_language.map(str::to_string),
            target_language: target_language.to_string(),
        };
        self.requests.lock().push(request.clone());

        match self.behavior {
            MockBehavior::Working => Ok(self.answer(&request)),
            MockBehavior::Echo => Ok(request.text),
            MockBehavior::Failing => Err(ProviderError::ConnectionError(
                "Simulated network failure".to_string(),
            )),
            MockBehavior::RejectSourceLanguage => match source_language {
                Some(code) => Err(ProviderError::InvalidLanguage(format!(
                    "invalid source language: {}",
                    code
                ))),
                None => Ok(self.answer(&request)),
            },
            MockBehavior::RejectAllLanguages => Err(ProviderError::InvalidLanguage(
                "invalid source language".to_string(),
            )),
            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        status_code: 503,
                        message: "Simulated intermittent failure".to_string(),
                    })
                } else {
                    Ok(self.answer(&request))
                }
            }
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(self.answer(&request))
            }
        }
    }

    fn probe_url(&self) -> String {
        "mock://local".to_string()
    }

    async fn test_connection(&self, _timeout: Duration) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError(
                "Simulated unreachable backend".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
