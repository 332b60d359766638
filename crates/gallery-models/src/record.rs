//! Persisted gallery records.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::image::{ImageAsset, ImageId, ImageStatus};

/// Persisted field names. These are part of the stored-data contract and
/// must not change.
pub mod fields {
    pub const OWNER: &str = "email";
    pub const RECORD_KEY: &str = "user_data";
    pub const STATUS: &str = "status";
    pub const STORAGE_LINK: &str = "s3link";
    pub const CONTRIBUTOR_ID: &str = "contributor_id";
    pub const DESCRIPTION: &str = "description";
    pub const IMAGE_TYPE: &str = "image_type";
    pub const MEDIA_TYPE: &str = "media_type";
    pub const SUBCLIP_CREATED: &str = "subclipCreated";
}

/// Metadata record keyed by `(owner_id, image_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GalleryRecord {
    #[serde(rename = "email")]
    pub owner_id: String,

    #[serde(rename = "image_id")]
    pub image_id: ImageId,

    pub status: ImageStatus,

    #[serde(rename = "s3link")]
    pub storage_link: String,

    pub contributor_id: String,

    pub description: String,

    pub image_type: String,

    pub media_type: String,

    #[serde(rename = "subclipCreated")]
    pub subclip_created: bool,
}

impl GalleryRecord {
    /// Initial record for a freshly stored original: `open`, no subclip.
    pub fn open(asset: &ImageAsset, owner_id: impl Into<String>, storage_link: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            image_id: asset.id.clone(),
            status: ImageStatus::Open,
            storage_link: storage_link.into(),
            contributor_id: asset.contributor_id.clone(),
            description: asset.description.clone(),
            image_type: asset.image_type.clone(),
            media_type: asset.media_type.clone(),
            subclip_created: false,
        }
    }

    /// Copy of this record in its initial lifecycle state.
    ///
    /// Stores apply this on `create`, so a re-ingest resets both axes.
    pub fn as_initial(&self) -> Self {
        Self {
            status: ImageStatus::Open,
            subclip_created: false,
            ..self.clone()
        }
    }

    /// Document key (`image_{id}`).
    pub fn record_key(&self) -> String {
        self.image_id.record_key()
    }

    /// Project the record back onto the asset shape.
    pub fn to_asset(&self, source_url: impl Into<String>) -> ImageAsset {
        ImageAsset {
            id: self.image_id.clone(),
            source_url: source_url.into(),
            owner_id: Some(self.owner_id.clone()),
            contributor_id: self.contributor_id.clone(),
            description: self.description.clone(),
            image_type: self.image_type.clone(),
            media_type: self.media_type.clone(),
            status: Some(self.status),
            subclip_created: self.subclip_created,
            storage_link: Some(self.storage_link.clone()),
        }
    }
}

/// A single mutable field of a record, with its new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Status(ImageStatus),
    SubclipCreated(bool),
}

impl RecordField {
    /// Persisted field name.
    pub fn name(&self) -> &'static str {
        match self {
            RecordField::Status(_) => fields::STATUS,
            RecordField::SubclipCreated(_) => fields::SUBCLIP_CREATED,
        }
    }

    /// Apply the value to an in-memory record.
    pub fn apply(&self, record: &mut GalleryRecord) {
        match *self {
            RecordField::Status(status) => record.status = status,
            RecordField::SubclipCreated(created) => record.subclip_created = created,
        }
    }
}
