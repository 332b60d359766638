//! Structured asset logging utilities.
//!
//! Every pipeline step logs through an `AssetLogger` so lifecycle events
//! carry the same `owner_id`, `image_id` and `operation` fields.

use tracing::{error, info, Span};

use gallery_models::ImageId;

/// Logger bound to one asset and one pipeline operation.
#[derive(Debug, Clone)]
pub struct AssetLogger {
    owner_id: String,
    image_id: String,
    operation: String,
}

impl AssetLogger {
    /// Create a new logger for an asset and operation.
    ///
    /// # Arguments
    /// * `owner_id` - The owning user
    /// * `image_id` - The provider image ID
    /// * `operation` - The pipeline step (e.g., "ingest_original", "create_derived")
    pub fn new(owner_id: &str, image_id: &ImageId, operation: &str) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            image_id: image_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            owner_id = %self.owner_id,
            image_id = %self.image_id,
            operation = %self.operation,
            "Step started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            owner_id = %self.owner_id,
            image_id = %self.image_id,
            operation = %self.operation,
            "Step progress: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            owner_id = %self.owner_id,
            image_id = %self.image_id,
            operation = %self.operation,
            "Step error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            owner_id = %self.owner_id,
            image_id = %self.image_id,
            operation = %self.operation,
            "Step completed: {}", message
        );
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn image_id(&self) -> &str {
        &self.image_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Span carrying the asset fields, for instrumenting a whole step.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "asset",
            owner_id = %self.owner_id,
            image_id = %self.image_id,
            operation = %self.operation
        )
    }
}
