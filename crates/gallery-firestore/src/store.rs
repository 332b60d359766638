//! Metadata store seam.

use async_trait::async_trait;
use gallery_models::{GalleryRecord, ImageId, RecordField};

use crate::error::FirestoreResult;

/// Keyed record store for gallery metadata.
///
/// Records are keyed by `(owner_id, image_id)`. There are no read-modify-write
/// primitives; concurrent writers to the same field race and the last write
/// wins.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Create or overwrite the record at its key.
    ///
    /// This is the initial write: the stored record is always `open` with
    /// `subclipCreated = false`, whatever the passed record carries.
    async fn create(&self, record: &GalleryRecord) -> FirestoreResult<()>;

    /// Set a single field on an existing record.
    ///
    /// Fails with `NotFound` when no record exists at the key.
    async fn update_field(
        &self,
        owner_id: &str,
        image_id: &ImageId,
        field: RecordField,
    ) -> FirestoreResult<()>;

    /// Read the record at a key.
    async fn get(&self, owner_id: &str, image_id: &ImageId) -> FirestoreResult<GalleryRecord>;
}
