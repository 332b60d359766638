//! Client for the stock image provider.
//!
//! Searches one page of the provider's image index and maps each result
//! onto the canonical `ImageAsset` shape. Failures are surfaced to the
//! caller and never retried here.

pub mod client;
pub mod error;
pub mod types;

pub use client::{ImageSearchClient, SearchClientConfig, StockSearchClient};
pub use error::{SearchError, SearchResult};
