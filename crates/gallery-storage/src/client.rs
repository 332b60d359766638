//! R2 client implementation.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use gallery_models::Bucket;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::store::{content_type_for, validate_key, BlobStore};

/// Configuration for R2 client.
#[derive(Debug, Clone)]
pub struct R2Config {
    /// R2 endpoint URL (S3 API endpoint)
    pub endpoint_url: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Bucket holding full-resolution originals
    pub originals_bucket: String,
    /// Bucket holding resized subclips
    pub subclips_bucket: String,
    /// Region (usually "auto" for R2)
    pub region: String,
}

impl R2Config {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            endpoint_url: std::env::var("R2_ENDPOINT_URL")
                .map_err(|_| StorageError::config_error("R2_ENDPOINT_URL not set"))?,
            access_key_id: std::env::var("R2_ACCESS_KEY_ID")
                .map_err(|_| StorageError::config_error("R2_ACCESS_KEY_ID not set"))?,
            secret_access_key: std::env::var("R2_SECRET_ACCESS_KEY")
                .map_err(|_| StorageError::config_error("R2_SECRET_ACCESS_KEY not set"))?,
            originals_bucket: std::env::var("GALLERY_BUCKET")
                .map_err(|_| StorageError::config_error("GALLERY_BUCKET not set"))?,
            subclips_bucket: std::env::var("SUBCLIPS_BUCKET")
                .map_err(|_| StorageError::config_error("SUBCLIPS_BUCKET not set"))?,
            region: std::env::var("R2_REGION").unwrap_or_else(|_| "auto".to_string()),
        })
    }

    /// Physical bucket name for a logical bucket.
    pub fn bucket_name(&self, bucket: Bucket) -> &str {
        match bucket {
            Bucket::Originals => &self.originals_bucket,
            Bucket::Subclips => &self.subclips_bucket,
        }
    }
}

/// Cloudflare R2 storage client.
#[derive(Clone)]
pub struct R2Client {
    client: Client,
    config: R2Config,
}

impl R2Client {
    /// Create a new R2 client from configuration.
    pub fn new(config: R2Config) -> StorageResult<Self> {
        if config.originals_bucket == config.subclips_bucket {
            return Err(StorageError::config_error(
                "GALLERY_BUCKET and SUBCLIPS_BUCKET must be different buckets",
            ));
        }

        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "r2",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(sdk_config),
            config,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        Self::new(R2Config::from_env()?)
    }

    fn bucket(&self, bucket: Bucket) -> &str {
        self.config.bucket_name(bucket)
    }

    /// Upload bytes with an explicit content type.
    pub async fn upload_bytes(
        &self,
        bucket: Bucket,
        data: Vec<u8>,
        key: &str,
        content_type: &str,
    ) -> StorageResult<()> {
        debug!("Uploading {} bytes to {}/{}", data.len(), bucket, key);

        self.client
            .put_object()
            .bucket(self.bucket(bucket))
            .key(key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        Ok(())
    }

    /// Download object as bytes.
    pub async fn download_bytes(&self, bucket: Bucket, key: &str) -> StorageResult<Vec<u8>> {
        debug!("Downloading {}/{}", bucket, key);

        let response = self
            .client
            .get_object()
            .bucket(self.bucket(bucket))
            .key(key)
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(service_err) if service_err.is_no_such_key() => StorageError::not_found(key),
                _ => StorageError::DownloadFailed(e.to_string()),
            })?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?
            .into_bytes()
            .to_vec();

        Ok(bytes)
    }

    /// Generate a presigned URL for GET.
    pub async fn presign_get(&self, bucket: Bucket, key: &str, expires_in: Duration) -> StorageResult<String> {
        let presign_config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(self.bucket(bucket))
            .key(key)
            .presigned(presign_config)
            .await
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }

    /// Check if an object exists.
    pub async fn exists(&self, bucket: Bucket, key: &str) -> StorageResult<bool> {
        match self
            .client
            .head_object()
            .bucket(self.bucket(bucket))
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => match e.as_service_error() {
                Some(service_err) if service_err.is_not_found() => Ok(false),
                _ => Err(StorageError::AwsSdk(e.to_string())),
            },
        }
    }

    /// Check connectivity to both buckets.
    pub async fn check_connectivity(&self) -> StorageResult<()> {
        for bucket in [Bucket::Originals, Bucket::Subclips] {
            self.client
                .head_bucket()
                .bucket(self.bucket(bucket))
                .send()
                .await
                .map_err(|e| {
                    StorageError::AwsSdk(format!("R2 connectivity check failed for {}: {}", bucket, e))
                })?;
        }
        info!("R2 buckets reachable");
        Ok(())
    }
}

#[async_trait]
impl BlobStore for R2Client {
    async fn put(&self, key: &str, bytes: Vec<u8>, bucket: Bucket) -> StorageResult<()> {
        validate_key(key)?;
        let content_type = content_type_for(&bytes);
        self.upload_bytes(bucket, bytes, key, content_type).await?;
        info!("Stored {}/{}", bucket, key);
        Ok(())
    }

    async fn get(&self, key: &str, bucket: Bucket) -> StorageResult<Vec<u8>> {
        validate_key(key)?;
        self.download_bytes(bucket, key).await
    }

    async fn presigned_read_url(&self, key: &str, bucket: Bucket, ttl: Duration) -> StorageResult<String> {
        validate_key(key)?;
        self.presign_get(bucket, key, ttl).await
    }
}
