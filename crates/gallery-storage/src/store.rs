//! Blob store abstraction.

use std::time::Duration;

use async_trait::async_trait;
use gallery_models::Bucket;

use crate::error::{StorageError, StorageResult};

/// Durable object storage over the originals and subclips buckets.
///
/// `put` overwrites an existing key. `presigned_read_url` does not check that
/// the key exists.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>, bucket: Bucket) -> StorageResult<()>;

    /// Fails with `StorageError::NotFound` when the key is absent.
    async fn get(&self, key: &str, bucket: Bucket) -> StorageResult<Vec<u8>>;

    async fn presigned_read_url(&self, key: &str, bucket: Bucket, ttl: Duration) -> StorageResult<String>;
}

pub(crate) fn validate_key(key: &str) -> StorageResult<()> {
    if key.trim().is_empty() {
        return Err(StorageError::InvalidKey("key must not be empty".to_string()));
    }
    if key.starts_with('/') {
        return Err(StorageError::InvalidKey(format!("key must be relative: {}", key)));
    }
    Ok(())
}

/// Content type for stored bytes, sniffed from the leading magic bytes.
pub fn content_type_for(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_sniffing() {
        assert_eq!(content_type_for(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
        assert_eq!(content_type_for(b"\x89PNG\r\n\x1a\n"), "image/png");
        assert_eq!(content_type_for(b"GIF89a"), "image/gif");
        assert_eq!(content_type_for(b"RIFF\0\0\0\0WEBPVP8 "), "image/webp");
        assert_eq!(content_type_for(b"hello"), "application/octet-stream");
        assert_eq!(content_type_for(&[]), "application/octet-stream");
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("provider/u1/provider_42").is_ok());
        assert!(matches!(validate_key(""), Err(StorageError::InvalidKey(_))));
        assert!(matches!(validate_key("  "), Err(StorageError::InvalidKey(_))));
        assert!(matches!(validate_key("/abs"), Err(StorageError::InvalidKey(_))));
    }
}
