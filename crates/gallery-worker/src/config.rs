//! Pipeline configuration.

use std::time::Duration;

use gallery_media::{SUBCLIP_HEIGHT, SUBCLIP_WIDTH};
use gallery_models::DEFAULT_PROVIDER;

/// Longest presigned URL lifetime S3-compatible stores accept (one week).
pub const MAX_PRESIGN_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Provider name used in blob keys
    pub provider: String,
    /// Lifetime of the storage link written to the record
    pub presign_ttl: Duration,
    /// Subclip width in pixels
    pub subclip_width: u32,
    /// Subclip height in pixels
    pub subclip_height: u32,
    /// Largest original the pipeline will fetch
    pub max_source_bytes: usize,
    /// Timeout for source fetches
    pub fetch_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            presign_ttl: Duration::from_secs(3600),
            subclip_width: SUBCLIP_WIDTH,
            subclip_height: SUBCLIP_HEIGHT,
            max_source_bytes: 25 * 1024 * 1024, // 25 MiB
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            provider: std::env::var("GALLERY_PROVIDER")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .unwrap_or(defaults.provider),
            presign_ttl: std::env::var("PRESIGN_TTL_SECS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|secs| (1..=MAX_PRESIGN_TTL_SECS).contains(secs))
                .map(Duration::from_secs)
                .unwrap_or(defaults.presign_ttl),
            subclip_width: std::env::var("SUBCLIP_WIDTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|w| *w > 0)
                .unwrap_or(defaults.subclip_width),
            subclip_height: std::env::var("SUBCLIP_HEIGHT")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|h| *h > 0)
                .unwrap_or(defaults.subclip_height),
            max_source_bytes: std::env::var("WORKER_MAX_SOURCE_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_source_bytes),
            fetch_timeout: Duration::from_secs(
                std::env::var("WORKER_FETCH_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }
}
