//! AI completion service configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Configuration for the hosted completion service.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Gemini API key
    pub gemini_api_key: Option<String>,

    /// Model used for interview and generation requests
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL for the completion REST API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.gemini_api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_api_key() {
            return Err(ValidationError::MissingRequired("GEMINI_API_KEY"));
        }

        if self.model.trim().is_empty() {
            return Err(ValidationError::invalid("model", "model name is empty"));
        }

        if self.timeout_secs == 0 {
            return Err(ValidationError::invalid(
                "timeout_secs",
                "timeout must be at least one second",
            ));
        }

        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout() -> u64 {
    30
}
