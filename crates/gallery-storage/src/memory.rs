//! In-process blob store.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use gallery_models::Bucket;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::store::{validate_key, BlobStore};

/// Blob store kept in memory, keyed by `(bucket, key)`.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    objects: RwLock<HashMap<(Bucket, String), Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, bucket: Bucket, key: &str) -> bool {
        self.objects.read().await.contains_key(&(bucket, key.to_string()))
    }

    /// Number of objects in one bucket.
    pub async fn len(&self, bucket: Bucket) -> usize {
        self.objects
            .read()
            .await
            .keys()
            .filter(|(b, _)| *b == bucket)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, bucket: Bucket) -> StorageResult<()> {
        validate_key(key)?;
        debug!("Storing {} bytes at {}/{}", bytes.len(), bucket, key);
        self.objects
            .write()
            .await
            .insert((bucket, key.to_string()), bytes);
        Ok(())
    }

    async fn get(&self, key: &str, bucket: Bucket) -> StorageResult<Vec<u8>> {
        validate_key(key)?;
        self.objects
            .read()
            .await
            .get(&(bucket, key.to_string()))
            .cloned()
            .ok_or_else(|| StorageError::not_found(format!("{}/{}", bucket, key)))
    }

    async fn presigned_read_url(&self, key: &str, bucket: Bucket, ttl: Duration) -> StorageResult<String> {
        validate_key(key)?;
        Ok(format!("memory://{}/{}?expires={}", bucket, key, ttl.as_secs()))
    }
}
