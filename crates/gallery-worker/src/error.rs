//! Pipeline error types.

use gallery_firestore::FirestoreError;
use gallery_media::MediaError;
use gallery_models::ValidationError;
use gallery_storage::StorageError;
use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Coarse classification callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    SourceFetchFailed,
    NotFound,
    DecodeError,
    UpstreamUnavailable,
    /// Any other adapter failure
    Internal,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Source fetch failed: {0}")]
    SourceFetchFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    Storage(#[source] StorageError),

    #[error("Firestore error: {0}")]
    Firestore(#[source] FirestoreError),

    #[error("Media error: {0}")]
    Media(#[source] MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn source_fetch_failed(msg: impl Into<String>) -> Self {
        Self::SourceFetchFailed(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::InvalidInput(_) => ErrorKind::InvalidInput,
            PipelineError::SourceFetchFailed(_) => ErrorKind::SourceFetchFailed,
            PipelineError::NotFound(_) => ErrorKind::NotFound,
            PipelineError::DecodeError(_) => ErrorKind::DecodeError,
            PipelineError::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            _ => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<ValidationError> for PipelineError {
    fn from(err: ValidationError) -> Self {
        PipelineError::InvalidInput(err.to_string())
    }
}

impl From<StorageError> for PipelineError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => PipelineError::NotFound(key),
            StorageError::InvalidKey(key) => PipelineError::InvalidInput(format!("invalid key: {}", key)),
            other => PipelineError::Storage(other),
        }
    }
}

impl From<FirestoreError> for PipelineError {
    fn from(err: FirestoreError) -> Self {
        match err {
            FirestoreError::NotFound(path) => PipelineError::NotFound(path),
            other => PipelineError::Firestore(other),
        }
    }
}

impl From<MediaError> for PipelineError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::DecodeError(msg) => PipelineError::DecodeError(msg),
            other => PipelineError::Media(other),
        }
    }
}
