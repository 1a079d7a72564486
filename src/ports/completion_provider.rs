//! Completion Provider Port - interface to the hosted completion service.
//!
//! Abstracts the text/JSON completion API behind a trait so the gateway and
//! flow can run against canned responses in tests. A request carries the
//! conversation messages, an optional system instruction, and — for
//! structured generation — a JSON schema the response body must satisfy.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Port for completion service interactions.
///
/// Implementations connect to an external service (Gemini in production)
/// and translate between its wire format and our request types.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate a single completion for the given request.
    ///
    /// When the request carries a `response_schema`, the returned content is
    /// the raw JSON text the service produced under that constraint; callers
    /// run their own strict decode on it.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError>;

    /// Get provider information (name, model).
    fn provider_info(&self) -> ProviderInfo;
}

/// Request for a completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Conversation messages (history + current user message).
    pub messages: Vec<Message>,
    /// System instruction guiding model behavior.
    pub system_instruction: Option<String>,
    /// Temperature for response randomness.
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    pub max_output_tokens: Option<u32>,
    /// Schema the response must satisfy (structured output). When set, the
    /// service is asked for a JSON document instead of free text.
    pub response_schema: Option<Value>,
}

impl CompletionRequest {
    /// Creates an empty request.
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            system_instruction: None,
            temperature: None,
            max_output_tokens: None,
            response_schema: None,
        }
    }

    /// Adds a message to the conversation.
    pub fn with_message(mut self, role: MessageRole, content: impl Into<String>) -> Self {
        self.messages.push(Message {
            role,
            content: content.into(),
        });
        self
    }

    /// Adds a batch of messages.
    pub fn with_messages(mut self, messages: impl IntoIterator<Item = Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    /// Sets the system instruction.
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Sets the temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the maximum tokens to generate.
    pub fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = Some(max);
        self
    }

    /// Constrains the response to a JSON schema.
    pub fn with_response_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    /// Returns true if this is a structured-output request.
    pub fn is_structured(&self) -> bool {
        self.response_schema.is_some()
    }
}

impl Default for CompletionRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// A message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message.
    pub role: MessageRole,
    /// Message content.
    pub content: String,
}

impl Message {
    /// Creates a new message.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Role of the message sender.
///
/// System guidance travels separately as the request's system instruction,
/// so only the two conversational roles exist here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User input.
    User,
    /// Assistant (model) response.
    Assistant,
}

/// Response from a completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    /// Generated content (free text, or raw JSON text for structured
    /// requests). May be empty when the service produced no candidate.
    pub content: String,
    /// Model that generated the response.
    pub model: String,
    /// Token usage reported by the service.
    pub usage: TokenUsage,
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt.
    pub prompt_tokens: u32,
    /// Tokens in the completion.
    pub completion_tokens: u32,
    /// Total tokens (prompt + completion).
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Creates new token usage.
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }

    /// Creates zero usage.
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Provider information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "gemini").
    pub name: String,
    /// Model identifier (e.g., "gemini-2.5-flash").
    pub model: String,
}

impl ProviderInfo {
    /// Creates new provider info.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// Completion service errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompletionError {
    /// Rate limited by the service.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Service is unavailable.
    #[error("service unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u32,
    },

    /// Failed to parse the service response envelope.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl CompletionError {
    /// Creates a rate limited error.
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CompletionError::RateLimited { .. }
                | CompletionError::Unavailable { .. }
                | CompletionError::Network(_)
                | CompletionError::Timeout { .. }
        )
    }
}
