//! Image ingestion and subclip derivation.
//!
//! Each step writes to exactly one external system and none of them are
//! transactional with each other:
//!
//! 1. `ingest_original`: source URL -> originals bucket -> metadata record (`open`)
//! 2. `close_image`: record `status = closed`
//! 3. `create_derived_asset`: originals bucket -> resize -> subclips bucket
//! 4. `mark_derived_created`: record `subclipCreated = true`
//!
//! Every write is keyed, so re-running a step with the same input is safe.

use std::sync::Arc;

use metrics::counter;
use reqwest::Client;
use tracing::{debug, info, Instrument};

use gallery_firestore::MetadataStore;
use gallery_media::ImageResizer;
use gallery_models::{BlobKey, Bucket, GalleryRecord, ImageAsset, ImageId, ImageStatus, RecordField};
use gallery_storage::BlobStore;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::events::ObjectCreatedEvent;
use crate::logging::AssetLogger;

/// Step counter, labelled by `step` and `outcome`.
pub const PIPELINE_STEPS_TOTAL: &str = "gallery_pipeline_steps_total";

fn record_step<T>(step: &'static str, result: &PipelineResult<T>) {
    let outcome = match result {
        Ok(_) => "success",
        Err(_) => "failure",
    };
    counter!(PIPELINE_STEPS_TOTAL, "step" => step, "outcome" => outcome).increment(1);
}

/// Build the HTTP client used for source fetches.
pub fn build_http_client(config: &PipelineConfig) -> PipelineResult<Client> {
    Client::builder()
        .timeout(config.fetch_timeout)
        .user_agent(concat!("gallery-worker/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| PipelineError::config_error(format!("failed to build HTTP client: {}", e)))
}

/// Orchestrates one asset through persistence and derivation.
///
/// Holds no mutable state of its own; clones share the same collaborators.
#[derive(Clone)]
pub struct IngestionPipeline {
    blobs: Arc<dyn BlobStore>,
    metadata: Arc<dyn MetadataStore>,
    resizer: Arc<dyn ImageResizer>,
    http: Client,
    config: PipelineConfig,
}

impl IngestionPipeline {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        metadata: Arc<dyn MetadataStore>,
        resizer: Arc<dyn ImageResizer>,
        http: Client,
        config: PipelineConfig,
    ) -> Self {
        Self {
            blobs,
            metadata,
            resizer,
            http,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Blob key for an asset owned by `owner_id`.
    pub fn blob_key(&self, owner_id: &str, image_id: &ImageId) -> BlobKey {
        BlobKey::new(self.config.provider.clone(), owner_id, image_id.clone())
    }

    /// Fetch the original, store it, and write the initial record.
    ///
    /// Nothing is written to the metadata store unless the blob write
    /// succeeded. A metadata failure after that leaves the blob in place.
    pub async fn ingest_original(&self, asset: &ImageAsset, owner_id: &str) -> PipelineResult<GalleryRecord> {
        validate_owner(owner_id)?;
        asset.validate_for_ingest()?;

        let logger = AssetLogger::new(owner_id, &asset.id, "ingest_original");
        let result = self
            .ingest_inner(asset, owner_id, &logger)
            .instrument(logger.create_span())
            .await;

        if let Err(e) = &result {
            logger.log_error(&e.to_string());
        }
        record_step("ingest_original", &result);
        result
    }

    async fn ingest_inner(
        &self,
        asset: &ImageAsset,
        owner_id: &str,
        logger: &AssetLogger,
    ) -> PipelineResult<GalleryRecord> {
        logger.log_start(&format!("fetching {}", asset.source_url));
        let bytes = self.fetch_source(&asset.source_url).await?;

        let key = self.blob_key(owner_id, &asset.id).as_key();
        logger.log_progress(&format!("storing {} bytes at {}", bytes.len(), key));
        self.blobs.put(&key, bytes, Bucket::Originals).await?;

        let link = self
            .blobs
            .presigned_read_url(&key, Bucket::Originals, self.config.presign_ttl)
            .await?;

        let record = GalleryRecord::open(asset, owner_id, link);
        self.metadata.create(&record).await?;

        logger.log_completion(&format!("record {} is open", record.record_key()));
        Ok(record)
    }

    /// Mark the record closed. Idempotent.
    pub async fn close_image(&self, image_id: &ImageId, owner_id: &str) -> PipelineResult<()> {
        validate_owner(owner_id)?;

        let logger = AssetLogger::new(owner_id, image_id, "close_image");
        let result = self
            .update_record(owner_id, image_id, RecordField::Status(ImageStatus::Closed), &logger)
            .await;
        record_step("close_image", &result);
        result
    }

    /// Resize the original at `key` into the subclips bucket under the same key.
    ///
    /// Does not touch the metadata record.
    pub async fn create_derived_asset(&self, key: &str) -> PipelineResult<()> {
        if key.trim().is_empty() {
            return Err(PipelineError::invalid_input("blob key is empty"));
        }

        let span = tracing::info_span!("create_derived", key = %key);
        let result = self.derive_inner(key).instrument(span).await;
        record_step("create_derived", &result);
        result
    }

    async fn derive_inner(&self, key: &str) -> PipelineResult<()> {
        let original = self.blobs.get(key, Bucket::Originals).await?;
        debug!("Fetched original {} ({} bytes)", key, original.len());

        let resizer = Arc::clone(&self.resizer);
        let (width, height) = (self.config.subclip_width, self.config.subclip_height);
        let resized = tokio::task::spawn_blocking(move || resizer.resize(&original, width, height))
            .await
            .map_err(|e| PipelineError::Io(std::io::Error::other(e)))??;

        self.blobs.put(key, resized, Bucket::Subclips).await?;
        info!("Stored {}x{} subclip at {}", width, height, key);
        Ok(())
    }

    /// Set `subclipCreated` on an existing record.
    ///
    /// Fails with `NotFound` rather than creating a record.
    pub async fn mark_derived_created(&self, image_id: &ImageId, owner_id: &str) -> PipelineResult<()> {
        validate_owner(owner_id)?;

        let logger = AssetLogger::new(owner_id, image_id, "mark_derived_created");
        let result = self
            .update_record(owner_id, image_id, RecordField::SubclipCreated(true), &logger)
            .await;
        record_step("mark_derived_created", &result);
        result
    }

    async fn update_record(
        &self,
        owner_id: &str,
        image_id: &ImageId,
        field: RecordField,
        logger: &AssetLogger,
    ) -> PipelineResult<()> {
        let result: PipelineResult<()> = self
            .metadata
            .update_field(owner_id, image_id, field)
            .instrument(logger.create_span())
            .await
            .map_err(Into::into);

        match &result {
            Ok(()) => logger.log_completion(&format!("{} updated", field.name())),
            Err(e) => logger.log_error(&e.to_string()),
        }
        result
    }

    /// Derive and mark every object in a created notification, in order.
    ///
    /// Stops at the first failure. Returns the keys that were processed.
    pub async fn handle_object_created(&self, event: &ObjectCreatedEvent) -> PipelineResult<Vec<BlobKey>> {
        let mut processed = Vec::with_capacity(event.objects.len());

        for object in &event.objects {
            let key = BlobKey::parse(&object.key)?;
            validate_provider(&key, &self.config.provider)?;
            validate_owner(key.owner_id())?;
            let logger = AssetLogger::new(key.owner_id(), key.image_id(), "object_created");
            logger.log_start(&format!("{}/{}", object.bucket, object.key));

            self.create_derived_asset(&object.key).await?;
            self.mark_derived_created(key.image_id(), key.owner_id()).await?;

            logger.log_completion("subclip created");
            processed.push(key);
        }

        Ok(processed)
    }

    /// One attempt at downloading the original, capped at `max_source_bytes`.
    async fn fetch_source(&self, url: &str) -> PipelineResult<Vec<u8>> {
        let max = self.config.max_source_bytes;

        let mut response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| PipelineError::source_fetch_failed(format!("{}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::source_fetch_failed(format!(
                "{} returned {}",
                url, status
            )));
        }

        if let Some(len) = response.content_length() {
            if len > max as u64 {
                return Err(PipelineError::source_fetch_failed(format!(
                    "{} is {} bytes, limit is {}",
                    url, len, max
                )));
            }
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| PipelineError::source_fetch_failed(format!("{}: {}", url, e)))?
        {
            if bytes.len() + chunk.len() > max {
                return Err(PipelineError::source_fetch_failed(format!(
                    "{} exceeds {} bytes",
                    url, max
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        if bytes.is_empty() {
            return Err(PipelineError::source_fetch_failed(format!("{} returned an empty body", url)));
        }
        Ok(bytes)
    }
}

fn validate_owner(owner_id: &str) -> PipelineResult<()> {
    if owner_id.trim().is_empty() {
        return Err(PipelineError::invalid_input("owner id is required"));
    }
    if owner_id.contains('/') {
        return Err(PipelineError::invalid_input("owner id must not contain '/'"));
    }
    Ok(())
}

fn validate_provider(key: &BlobKey, provider: &str) -> PipelineResult<()> {
    if key.provider() != provider {
        return Err(PipelineError::invalid_input(format!(
            "blob key provider '{}' does not match '{}'",
            key.provider(),
            provider
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_owner() {
        assert!(validate_owner("u1").is_ok());
        assert!(validate_owner("jane@example.com").is_ok());
        assert!(matches!(validate_owner(""), Err(PipelineError::InvalidInput(_))));
        assert!(matches!(validate_owner("   "), Err(PipelineError::InvalidInput(_))));
        assert!(matches!(validate_owner("a/b"), Err(PipelineError::InvalidInput(_))));
    }

    #[test]
    fn test_validate_provider() {
        let key = BlobKey::parse("provider/u1/provider_42").unwrap();
        assert!(validate_provider(&key, "provider").is_ok());
        assert!(matches!(
            validate_provider(&key, "shutterstock"),
            Err(PipelineError::InvalidInput(_))
        ));
    }
}
