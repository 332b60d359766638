//! Error types for image operations.

use thiserror::Error;

/// Result type for image operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while resizing.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Input is not a decodable image: {0}")]
    DecodeError(String),

    #[error("Failed to encode image: {0}")]
    EncodeError(String),

    #[error("Invalid target dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

impl MediaError {
    pub fn decode(message: impl Into<String>) -> Self {
        Self::DecodeError(message.into())
    }

    pub fn is_decode_error(&self) -> bool {
        matches!(self, MediaError::DecodeError(_))
    }
}
