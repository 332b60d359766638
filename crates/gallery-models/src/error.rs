//! Validation errors for model types.

use thiserror::Error;

/// Result type for model validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Errors raised when a model value is unusable before any external call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Malformed blob key: {0}")]
    MalformedKey(String),
}

impl ValidationError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}
