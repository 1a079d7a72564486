//! Configuration error types

use thiserror::Error;

/// Errors raised while loading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Errors raised while validating configuration values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("required configuration value is missing: {0}")]
    MissingRequired(&'static str),

    #[error("configuration value '{field}' is invalid: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

impl ValidationError {
    /// Creates an invalid-value error.
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
