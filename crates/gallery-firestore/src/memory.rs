//! In-process metadata store.

use std::collections::HashMap;

use async_trait::async_trait;
use gallery_models::{GalleryRecord, ImageId, RecordField};
use tokio::sync::RwLock;

use crate::error::{FirestoreError, FirestoreResult};
use crate::store::MetadataStore;

/// Metadata store kept in memory, keyed by `(owner_id, image_id)`.
#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    records: RwLock<HashMap<(String, ImageId), GalleryRecord>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

fn missing(owner_id: &str, image_id: &ImageId) -> FirestoreError {
    FirestoreError::not_found(format!("users/{}/gallery/{}", owner_id, image_id.record_key()))
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn create(&self, record: &GalleryRecord) -> FirestoreResult<()> {
        self.records.write().await.insert(
            (record.owner_id.clone(), record.image_id.clone()),
            record.as_initial(),
        );
        Ok(())
    }

    async fn update_field(
        &self,
        owner_id: &str,
        image_id: &ImageId,
        field: RecordField,
    ) -> FirestoreResult<()> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&(owner_id.to_string(), image_id.clone()))
            .ok_or_else(|| missing(owner_id, image_id))?;
        field.apply(record);
        Ok(())
    }

    async fn get(&self, owner_id: &str, image_id: &ImageId) -> FirestoreResult<GalleryRecord> {
        self.records
            .read()
            .await
            .get(&(owner_id.to_string(), image_id.clone()))
            .cloned()
            .ok_or_else(|| missing(owner_id, image_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_models::{ImageAsset, ImageStatus};

    fn record(owner: &str, id: &str) -> GalleryRecord {
        let asset = ImageAsset::from_provider(id, "https://img", "c1", "d", "photo", "image");
        GalleryRecord::open(&asset, owner, "link")
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let store = MemoryMetadataStore::new();
        store.create(&record("u1", "42")).await.unwrap();

        let got = store.get("u1", &ImageId::from("42")).await.unwrap();
        assert_eq!(got.status, ImageStatus::Open);
        assert!(!got.subclip_created);
    }

    #[tokio::test]
    async fn test_create_overwrites_and_resets() {
        let store = MemoryMetadataStore::new();
        let id = ImageId::from("42");
        store.create(&record("u1", "42")).await.unwrap();
        store
            .update_field("u1", &id, RecordField::SubclipCreated(true))
            .await
            .unwrap();

        store.create(&record("u1", "42")).await.unwrap();
        assert_eq!(store.len().await, 1);
        assert!(!store.get("u1", &id).await.unwrap().subclip_created);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = MemoryMetadataStore::new();
        let err = store
            .update_field("u1", &ImageId::from("42"), RecordField::Status(ImageStatus::Closed))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_owners_are_separate() {
        let store = MemoryMetadataStore::new();
        store.create(&record("u1", "42")).await.unwrap();
        assert!(store.get("u2", &ImageId::from("42")).await.unwrap_err().is_not_found());
    }
}
