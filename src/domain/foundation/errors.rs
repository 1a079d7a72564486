//! Error types for the domain layer.

use thiserror::Error;

/// Errors raised by domain value objects and entities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("field '{field}' cannot be empty")]
    EmptyField { field: &'static str },

    #[error("field '{field}' has invalid value: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: String,
    },
}

impl DomainError {
    /// Creates an empty field error.
    pub fn empty_field(field: &'static str) -> Self {
        DomainError::EmptyField { field }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(field: &'static str, reason: impl Into<String>) -> Self {
        DomainError::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_field_displays_field_name() {
        let err = DomainError::empty_field("tagline");
        assert_eq!(err.to_string(), "field 'tagline' cannot be empty");
    }

    #[test]
    fn invalid_value_displays_reason() {
        let err = DomainError::invalid_value("tags", "too many entries");
        assert_eq!(
            err.to_string(),
            "field 'tags' has invalid value: too many entries"
        );
    }
}
