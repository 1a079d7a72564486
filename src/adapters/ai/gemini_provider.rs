//! Gemini Provider - Implementation of CompletionProvider for the Gemini
//! REST API.
//!
//! Talks to the `generateContent` endpoint. Structured-output requests set
//! `responseMimeType: application/json` plus the response schema in the
//! generation config, so the service returns a JSON document instead of
//! free text.
//!
//! # Configuration
//!
//! ```ignore
//! let config = GeminiConfig::new(api_key)
//!     .with_model("gemini-2.5-flash")
//!     .with_timeout(Duration::from_secs(30));
//!
//! let provider = GeminiProvider::new(config);
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::AiConfig;
use crate::ports::{
    CompletionError, CompletionProvider, CompletionRequest, CompletionResponse, MessageRole,
    ProviderInfo, TokenUsage,
};

/// Configuration for the Gemini provider.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use (e.g., "gemini-2.5-flash").
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Builds a configuration from the application config.
    ///
    /// # Errors
    ///
    /// - `ValidationError` if the AI section fails validation
    pub fn from_app_config(config: &AiConfig) -> Result<Self, crate::config::ValidationError> {
        config.validate()?;
        let api_key = config.gemini_api_key.clone().unwrap_or_default();
        Ok(Self::new(api_key)
            .with_model(config.model.clone())
            .with_base_url(config.base_url.clone())
            .with_timeout(config.timeout()))
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

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Gemini API provider implementation.
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    /// Creates a new Gemini provider with the given configuration.
    pub fn new(config: GeminiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Builds the generateContent endpoint URL.
    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }

    /// Converts our request to Gemini's wire format.
    fn to_gemini_request(&self, request: &CompletionRequest) -> GenerateContentRequest {
        let contents = request
            .messages
            .iter()
            .map(|msg| Content {
                role: Some(
                    match msg.role {
                        MessageRole::User => "user",
                        MessageRole::Assistant => "model",
                    }
                    .to_string(),
                ),
                parts: vec![Part {
                    text: msg.content.clone(),
                }],
            })
            .collect();

        let generation_config = if request.response_schema.is_some()
            || request.temperature.is_some()
            || request.max_output_tokens.is_some()
        {
            Some(GenerationConfig {
                response_mime_type: request
                    .response_schema
                    .as_ref()
                    .map(|_| "application/json".to_string()),
                response_schema: request.response_schema.clone(),
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
            })
        } else {
            None
        };

        GenerateContentRequest {
            system_instruction: request.system_instruction.as_ref().map(|text| Content {
                role: None,
                parts: vec![Part { text: text.clone() }],
            }),
            contents,
            generation_config,
        }
    }

    async fn send_request(
        &self,
        request: &CompletionRequest,
    ) -> Result<Response, CompletionError> {
        let gemini_request = self.to_gemini_request(request);

        self.client
            .post(self.generate_url())
            .header("x-goog-api-key", self.config.api_key())
            .header("Content-Type", "application/json")
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    CompletionError::network(format!("Connection failed: {}", e))
                } else {
                    CompletionError::network(e.to_string())
                }
            })
    }

    /// Maps non-success statuses to the error taxonomy.
    async fn handle_response_status(
        &self,
        response: Response,
    ) -> Result<Response, CompletionError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 | 403 => Err(CompletionError::AuthenticationFailed),
            429 => Err(CompletionError::rate_limited(parse_retry_after(&error_body))),
            400 => Err(CompletionError::InvalidRequest(error_body)),
            500..=599 => Err(CompletionError::unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(CompletionError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }
}

/// Parses retry-after from the error body, defaulting to 30 seconds.
fn parse_retry_after(error_body: &str) -> u32 {
    serde_json::from_str::<Value>(error_body)
        .ok()
        .and_then(|parsed| {
            parsed
                .get("error")?
                .get("details")?
                .as_array()?
                .iter()
                .find_map(|d| d.get("retryDelay")?.as_str()?.trim_end_matches('s').parse().ok())
        })
        .unwrap_or(30)
}

/// Flattens the first candidate's parts into one string.
fn extract_content(response: &GenerateContentResponse) -> String {
    response
        .candidates
        .first()
        .map(|candidate| {
            candidate
                .content
                .parts
                .iter()
                .map(|part| part.text.as_str())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

fn extract_usage(response: &GenerateContentResponse) -> TokenUsage {
    response
        .usage_metadata
        .as_ref()
        .map(|usage| TokenUsage::new(usage.prompt_token_count, usage.candidates_token_count))
        .unwrap_or_else(TokenUsage::zero)
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, CompletionError> {
        let response = self.send_request(&request).await?;
        let response = self.handle_response_status(response).await?;

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::parse(format!("Invalid response envelope: {}", e)))?;

        let content = extract_content(&parsed);
        let usage = extract_usage(&parsed);

        debug!(
            model = %self.config.model,
            total_tokens = usage.total_tokens,
            structured = request.is_structured(),
            "completion received"
        );

        Ok(CompletionResponse {
            content,
            model: self.config.model.clone(),
            usage,
        })
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("gemini", self.config.model.clone())
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(rename = "responseSchema", skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct UsageMetadata {
    #[serde(rename = "promptTokenCount", default)]
    prompt_token_count: u32,
    #[serde(rename = "candidatesTokenCount", default)]
    candidates_token_count: u32,
}
