//! Gallery metadata store.
//!
//! This crate provides:
//! - The `MetadataStore` seam keyed by `(owner_id, image_id)`
//! - A Firestore REST client with service account authentication via gcp_auth
//! - `GalleryRepository`, the Firestore-backed metadata store
//! - An in-memory metadata store for tests and local runs

pub mod client;
pub mod error;
pub mod gallery_repo;
pub mod memory;
pub mod metrics;
pub mod store;
pub mod token_cache;
pub mod types;

#[cfg(test)]
mod client_tests;

pub use client::{FirestoreClient, FirestoreConfig};
pub use error::{FirestoreError, FirestoreResult};
pub use gallery_repo::GalleryRepository;
pub use memory::MemoryMetadataStore;
pub use store::MetadataStore;
pub use types::{Document, FromFirestoreValue, ToFirestoreValue, Value};
