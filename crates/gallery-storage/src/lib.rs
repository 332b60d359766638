//! Blob storage for gallery images.
//!
//! This crate provides:
//! - The `BlobStore` seam (put / get / presigned read URL)
//! - A Cloudflare R2 (S3 API) implementation over two logical buckets
//! - An in-memory implementation for tests and local runs

pub mod client;
pub mod error;
pub mod memory;
pub mod store;

pub use client::{R2Client, R2Config};
pub use error::{StorageError, StorageResult};
pub use memory::MemoryBlobStore;
pub use store::{content_type_for, BlobStore};
