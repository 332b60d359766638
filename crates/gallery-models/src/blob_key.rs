//! Blob key convention and logical bucket selection.
//!
//! Keys have the form `{provider}/{owner_id}/{provider}_{image_id}` and are
//! identical in the originals and subclips buckets.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};
use crate::image::ImageId;

/// Provider prefix used when none is configured.
pub const DEFAULT_PROVIDER: &str = "shutterstock";

/// Logical storage namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    /// Full-resolution originals
    Originals,
    /// Resized derived copies
    Subclips,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Originals => "originals",
            Bucket::Subclips => "subclips",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured form of a blob key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobKey {
    provider: String,
    owner_id: String,
    image_id: ImageId,
}

impl BlobKey {
    pub fn new(provider: impl Into<String>, owner_id: impl Into<String>, image_id: ImageId) -> Self {
        Self {
            provider: provider.into(),
            owner_id: owner_id.into(),
            image_id,
        }
    }

    /// Parse a raw key back into its parts.
    ///
    /// The owner segment may itself contain `/`; provider and file name are
    /// taken from the first and last segments.
    pub fn parse(raw: &str) -> ValidationResult<Self> {
        let malformed = || ValidationError::MalformedKey(raw.to_string());

        let (provider, rest) = raw.split_once('/').ok_or_else(malformed)?;
        let (owner_id, file_name) = rest.rsplit_once('/').ok_or_else(malformed)?;

        if provider.is_empty() || owner_id.is_empty() {
            return Err(malformed());
        }

        let image_id = file_name
            .strip_prefix(provider)
            .and_then(|s| s.strip_prefix('_'))
            .filter(|id| !id.is_empty())
            .ok_or_else(malformed)?;

        Ok(Self::new(provider, owner_id, ImageId::from(image_id)))
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn image_id(&self) -> &ImageId {
        &self.image_id
    }

    /// Render the storage key.
    pub fn as_key(&self) -> String {
        format!(
            "{}/{}/{}_{}",
            self.provider, self.owner_id, self.provider, self.image_id
        )
    }
}

impl fmt::Display for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let key = BlobKey::new("provider", "u1", ImageId::from("42"));
        assert_eq!(key.as_key(), "provider/u1/provider_42");
        assert_eq!(key.to_string(), "provider/u1/provider_42");
    }

    #[test]
    fn test_parse_round_trip() {
        let key = BlobKey::new(DEFAULT_PROVIDER, "someone@example.com", ImageId::from("1234567"));
        let parsed = BlobKey::parse(&key.as_key()).unwrap();
        assert_eq!(parsed, key);
        assert_eq!(parsed.owner_id(), "someone@example.com");
        assert_eq!(parsed.image_id().as_str(), "1234567");
    }

    #[test]
    fn test_parse_image_id_with_underscore() {
        let parsed = BlobKey::parse("provider/u1/provider_a_b").unwrap();
        assert_eq!(parsed.image_id().as_str(), "a_b");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for raw in [
            "",
            "provider",
            "provider/u1",
            "provider//provider_42",
            "/u1/provider_42",
            "provider/u1/other_42",
            "provider/u1/provider_",
            "provider/u1/provider42",
        ] {
            assert!(
                matches!(BlobKey::parse(raw), Err(ValidationError::MalformedKey(_))),
                "expected {:?} to be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_bucket_names() {
        assert_eq!(Bucket::Originals.as_str(), "originals");
        assert_eq!(Bucket::Subclips.to_string(), "subclips");
    }
}
