//! Shared data models for the gallery ingestion backend.
//!
//! This crate provides Serde-serializable types for:
//! - Image assets as returned by the stock provider search
//! - Persisted gallery records and their lifecycle status
//! - Blob keys and logical bucket selection
//! - Structured search queries

pub mod blob_key;
pub mod error;
pub mod image;
pub mod record;
pub mod search;

// Re-export common types
pub use blob_key::{BlobKey, Bucket, DEFAULT_PROVIDER};
pub use error::{ValidationError, ValidationResult};
pub use image::{ImageAsset, ImageId, ImageStatus};
pub use record::{GalleryRecord, RecordField};
pub use search::{SearchQuery, SearchSort};
