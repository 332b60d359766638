//! Provider wire types for `GET /v2/images/search`.

use serde::Deserialize;
use tracing::warn;

use gallery_models::ImageAsset;

/// One page of search results.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    /// Absent when the provider has nothing to say
    #[serde(default)]
    pub data: Option<Vec<ProviderImage>>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderImage {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_type: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub contributor: Option<Contributor>,
    #[serde(default)]
    pub assets: Option<Assets>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Contributor {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Assets {
    #[serde(default)]
    pub huge_thumb: Option<Thumbnail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

impl ProviderImage {
    /// Map onto the canonical asset. `None` when there is no display URL.
    pub fn into_asset(self) -> Option<ImageAsset> {
        let Some(url) = self.assets.and_then(|a| a.huge_thumb).map(|t| t.url) else {
            warn!("Skipping provider image {} without huge_thumb", self.id);
            return None;
        };

        Some(ImageAsset::from_provider(
            self.id,
            url,
            self.contributor.map(|c| c.id).unwrap_or_default(),
            self.description.unwrap_or_default(),
            self.image_type.unwrap_or_default(),
            self.media_type.unwrap_or_default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_asset_maps_fields() {
        let image: ProviderImage = serde_json::from_value(serde_json::json!({
            "id": "42",
            "description": "sunset",
            "image_type": "photo",
            "media_type": "image",
            "contributor": {"id": "c1"},
            "assets": {
                "preview": {"url": "https://img/preview/42.jpg"},
                "huge_thumb": {"url": "https://img/42.jpg", "height": 260, "width": 390}
            }
        }))
        .unwrap();

        let asset = image.into_asset().unwrap();
        assert_eq!(asset.id.as_str(), "42");
        assert_eq!(asset.source_url, "https://img/42.jpg");
        assert_eq!(asset.contributor_id, "c1");
        assert_eq!(asset.description, "sunset");
        assert_eq!(asset.image_type, "photo");
        assert_eq!(asset.media_type, "image");
        assert!(asset.owner_id.is_none());
        assert!(asset.status.is_none());
        assert!(!asset.subclip_created);
        assert!(asset.storage_link.is_none());
    }

    #[test]
    fn test_missing_huge_thumb_is_skipped() {
        let image: ProviderImage = serde_json::from_value(serde_json::json!({
            "id": "7",
            "assets": {"preview": {"url": "https://img/preview/7.jpg"}}
        }))
        .unwrap();
        assert!(image.into_asset().is_none());
    }
}
