//! Image ingestion worker.
//!
//! This crate provides:
//! - `IngestionPipeline`: ingest, close, derive and mark steps
//! - Object-created notification parsing and handling
//! - Pipeline configuration and structured asset logging

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod pipeline;

pub use config::PipelineConfig;
pub use error::{ErrorKind, PipelineError, PipelineResult};
pub use events::{CreatedObject, ObjectCreatedEvent};
pub use logging::AssetLogger;
pub use pipeline::{build_http_client, IngestionPipeline};
