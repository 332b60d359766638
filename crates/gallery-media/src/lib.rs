//! Image processing for the gallery backend.
//!
//! This crate provides:
//! - The `ImageResizer` seam used by the ingestion pipeline
//! - An `image`-crate backed implementation producing subclips

pub mod error;
pub mod resize;

pub use error::{MediaError, MediaResult};
pub use resize::{ImageResizer, SubclipResizer, SUBCLIP_HEIGHT, SUBCLIP_WIDTH};
