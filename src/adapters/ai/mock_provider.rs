//! Mock completion provider for testing.
//!
//! Configurable implementation of the CompletionProvider port, allowing
//! tests to run without calling the real service.
//!
//! # Features
//!
//! - Pre-configured replies, consumed in order
//! - Error injection for resilience testing
//! - Simulated delays for timeout testing
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockCompletionProvider::new()
//!     .with_reply("Hello, I'm the assistant!");
//!
//! let response = provider.complete(request).await?;
//! assert_eq!(response.content, "Hello, I'm the assistant!");
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    CompletionError, CompletionProvider, CompletionRequest, CompletionResponse, ProviderInfo,
    TokenUsage,
};

/// Mock completion provider.
///
/// Clones share the reply queue and the call history, so a test can hold
/// one handle for assertions while the gateway owns another.
#[derive(Debug, Clone)]
pub struct MockCompletionProvider {
    /// Pre-configured outcomes (consumed in order).
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    /// Simulated latency per request.
    delay: Duration,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

#[derive(Debug, Clone)]
enum MockReply {
    Success(String),
    Failure(MockFailure),
}

/// Failure modes the mock can inject.
#[derive(Debug, Clone)]
pub enum MockFailure {
    /// Simulate rate limiting.
    RateLimited { retry_after_secs: u32 },
    /// Simulate authentication failure.
    AuthenticationFailed,
    /// Simulate service unavailability.
    Unavailable { message: String },
    /// Simulate a network error.
    Network { message: String },
    /// Simulate a timeout.
    Timeout { timeout_secs: u32 },
}

impl From<MockFailure> for CompletionError {
    fn from(failure: MockFailure) -> Self {
        match failure {
            MockFailure::RateLimited { retry_after_secs } => {
                CompletionError::rate_limited(retry_after_secs)
            }
            MockFailure::AuthenticationFailed => CompletionError::AuthenticationFailed,
            MockFailure::Unavailable { message } => CompletionError::unavailable(message),
            MockFailure::Network { message } => CompletionError::network(message),
            MockFailure::Timeout { timeout_secs } => CompletionError::Timeout { timeout_secs },
        }
    }
}

impl Default for MockCompletionProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCompletionProvider {
    /// Creates a new mock provider with default settings.
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a successful reply.
    pub fn with_reply(self, content: impl Into<String>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(MockReply::Success(content.into()));
        self
    }

    /// Queues a failure.
    pub fn with_failure(self, failure: MockFailure) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(MockReply::Failure(failure));
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Clears the call history.
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Gets the next configured outcome, or a default reply.
    fn next_reply(&self) -> MockReply {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MockReply::Success("Mock reply".to_string()))
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        self.calls.lock().unwrap().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_reply() {
            MockReply::Success(content) => Ok(CompletionResponse {
                content,
                model: "mock-model".to_string(),
                usage: TokenUsage::new(10, 20),
            }),
            MockReply::Failure(failure) => Err(failure.into()),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("mock", "mock-model")
    }
}
