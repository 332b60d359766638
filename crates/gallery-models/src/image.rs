//! Image asset models.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ValidationError, ValidationResult};

/// Provider-assigned image identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ImageId(pub String);

impl ImageId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Document key used for the metadata record (`image_{id}`).
    pub fn record_key(&self) -> String {
        format!("image_{}", self.0)
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ImageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ImageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Owner-facing lifecycle status of an ingested image.
///
/// Starts `Open` when the record is created and only ever moves to `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImageStatus {
    /// Record exists, processing may be incomplete
    #[default]
    Open,
    /// Owning workflow is done with the image
    Closed,
}

impl ImageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageStatus::Open => "open",
            ImageStatus::Closed => "closed",
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, ImageStatus::Closed)
    }
}

impl fmt::Display for ImageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ImageStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(ImageStatus::Open),
            "closed" => Ok(ImageStatus::Closed),
            other => Err(ValidationError::invalid(
                "status",
                format!("expected 'open' or 'closed', got '{}'", other),
            )),
        }
    }
}

/// One image known to the pipeline.
///
/// Search results only carry the provider-supplied fields; `owner_id`,
/// `status` and `storage_link` stay `None` and `subclip_created` stays
/// `false` until ingestion fills them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ImageAsset {
    /// Provider-assigned identifier
    pub id: ImageId,

    /// Origin URL at the provider (display-size asset)
    #[serde(rename = "url")]
    pub source_url: String,

    /// User who owns the ingested copy
    #[serde(rename = "user", default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,

    pub contributor_id: String,

    #[serde(default)]
    pub description: String,

    pub image_type: String,

    pub media_type: String,

    /// Lifecycle status, absent until a metadata record exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ImageStatus>,

    /// Whether the derived low-resolution asset exists
    #[serde(rename = "subclipCreated", default)]
    pub subclip_created: bool,

    /// Reference to the stored original
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_link: Option<String>,
}

impl ImageAsset {
    /// Build a transient search result with only provider fields populated.
    pub fn from_provider(
        id: impl Into<ImageId>,
        source_url: impl Into<String>,
        contributor_id: impl Into<String>,
        description: impl Into<String>,
        image_type: impl Into<String>,
        media_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_url: source_url.into(),
            owner_id: None,
            contributor_id: contributor_id.into(),
            description: description.into(),
            image_type: image_type.into(),
            media_type: media_type.into(),
            status: None,
            subclip_created: false,
            storage_link: None,
        }
    }

    /// Check the fields ingestion depends on.
    pub fn validate_for_ingest(&self) -> ValidationResult<()> {
        if self.id.as_str().trim().is_empty() {
            return Err(ValidationError::MissingField("id"));
        }
        if self.id.as_str().contains('/') {
            return Err(ValidationError::invalid("id", "must not contain '/'"));
        }

        let source = self.source_url.trim();
        if source.is_empty() {
            return Err(ValidationError::MissingField("url"));
        }

        let parsed = Url::parse(source)
            .map_err(|e| ValidationError::invalid("url", e.to_string()))?;
        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ValidationError::invalid(
                "url",
                format!("unsupported scheme '{}'", other),
            )),
        }
    }

    /// True once ingestion has persisted this asset.
    pub fn is_persisted(&self) -> bool {
        self.status.is_some() && self.storage_link.is_some()
    }
}
