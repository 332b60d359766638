//! Subclip worker binary.
//!
//! Reads one object-created notification (from the file given as the first
//! argument, or stdin) and derives the subclip for every object in it.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::AsyncReadExt;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gallery_firestore::{FirestoreClient, GalleryRepository};
use gallery_media::SubclipResizer;
use gallery_storage::R2Client;
use gallery_worker::{build_http_client, IngestionPipeline, ObjectCreatedEvent, PipelineConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    dotenvy::dotenv().ok();

    init_tracing()?;

    let event = read_event().await?;
    info!("Received notification with {} object(s)", event.objects.len());

    let pipeline = build_pipeline().await?;

    match pipeline.handle_object_created(&event).await {
        Ok(keys) => {
            info!("Derived {} subclip(s)", keys.len());
            Ok(())
        }
        Err(e) => {
            error!(kind = ?e.kind(), "Object-created handling failed: {}", e);
            Err(e.into())
        }
    }
}

/// Colored output for dev, JSON for production.
fn init_tracing() -> anyhow::Result<()> {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("gallery=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
    Ok(())
}

async fn read_event() -> anyhow::Result<ObjectCreatedEvent> {
    let raw = match std::env::args().nth(1) {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("reading notification from {}", path))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("reading notification from stdin")?;
            buf
        }
    };

    Ok(ObjectCreatedEvent::from_json(&raw)?)
}

async fn build_pipeline() -> anyhow::Result<IngestionPipeline> {
    let config = PipelineConfig::from_env();
    info!("Pipeline config: {:?}", config);

    let blobs = R2Client::from_env().context("configuring R2")?;
    let firestore = FirestoreClient::from_env().await.context("configuring Firestore")?;
    let http = build_http_client(&config)?;

    Ok(IngestionPipeline::new(
        Arc::new(blobs),
        Arc::new(GalleryRepository::new(firestore)),
        Arc::new(SubclipResizer::new()),
        http,
        config,
    ))
}
