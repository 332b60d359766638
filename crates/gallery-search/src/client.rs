//! Stock provider HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use gallery_models::{ImageAsset, SearchQuery};

use crate::error::{SearchError, SearchResult};
use crate::types::SearchResponse;

const DEFAULT_BASE_URL: &str = "https://api.shutterstock.com";

/// Configuration for the stock search client.
#[derive(Debug, Clone)]
pub struct SearchClientConfig {
    /// Provider API root
    pub base_url: String,
    /// Bearer token
    pub api_token: String,
    /// Request timeout
    pub timeout: Duration,
}

impl SearchClientConfig {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_token: api_token.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> SearchResult<Self> {
        let api_token = std::env::var("STOCK_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| SearchError::config_error("STOCK_API_TOKEN must be set"))?;

        Ok(Self {
            base_url: std::env::var("STOCK_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_token,
            timeout: Duration::from_secs(
                std::env::var("STOCK_API_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        })
    }
}

/// Search seam over the external image index.
#[async_trait]
pub trait ImageSearchClient: Send + Sync {
    /// One page of results. Lifecycle fields are left unset.
    async fn search(&self, query: &SearchQuery) -> SearchResult<Vec<ImageAsset>>;
}

/// Client for the stock provider's v2 image search.
pub struct StockSearchClient {
    http: Client,
    config: SearchClientConfig,
}

impl StockSearchClient {
    pub fn new(config: SearchClientConfig) -> SearchResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("gallery-search/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(SearchError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> SearchResult<Self> {
        Self::new(SearchClientConfig::from_env()?)
    }
}

#[async_trait]
impl ImageSearchClient for StockSearchClient {
    async fn search(&self, query: &SearchQuery) -> SearchResult<Vec<ImageAsset>> {
        query.validate()?;

        let url = format!("{}/v2/images/search", self.config.base_url.trim_end_matches('/'));
        debug!("Searching provider for '{}'", query.query);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.config.api_token)
            .query(query)
            .send()
            .await
            .map_err(|e| SearchError::upstream(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::upstream(format!(
                "provider returned {}: {}",
                status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::upstream(format!("reading response failed: {}", e)))?;
        let page: SearchResponse = serde_json::from_str(&body).map_err(|e| {
            SearchError::InvalidResponse(format!(
                "{} (body prefix: {})",
                e,
                body.chars().take(200).collect::<String>()
            ))
        })?;

        let data = page
            .data
            .ok_or_else(|| SearchError::upstream("provider returned no data"))?;

        let assets: Vec<ImageAsset> = data.into_iter().filter_map(|image| image.into_asset()).collect();
        info!(
            "Provider search '{}' returned {} assets (total {})",
            query.query,
            assets.len(),
            page.total_count.unwrap_or_default()
        );
        Ok(assets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> StockSearchClient {
        let mut config = SearchClientConfig::new("test-token");
        config.base_url = server.uri();
        config.timeout = Duration::from_secs(5);
        StockSearchClient::new(config).unwrap()
    }

    fn page_body() -> serde_json::Value {
        json!({
            "page": 1,
            "per_page": 2,
            "total_count": 2,
            "data": [
                {
                    "id": "42",
                    "description": "sunset",
                    "image_type": "photo",
                    "media_type": "image",
                    "contributor": {"id": "c1"},
                    "assets": {"huge_thumb": {"url": "https://img/42.jpg"}}
                },
                {
                    "id": "43",
                    "description": "no thumb",
                    "image_type": "photo",
                    "media_type": "image",
                    "contributor": {"id": "c2"},
                    "assets": {}
                }
            ]
        })
    }

    #[test]
    #[serial]
    fn test_config_requires_token() {
        std::env::remove_var("STOCK_API_TOKEN");
        assert!(matches!(
            SearchClientConfig::from_env(),
            Err(SearchError::ConfigError(_))
        ));
    }

    #[test]
    #[serial]
    fn test_config_defaults() {
        std::env::set_var("STOCK_API_TOKEN", "t");
        std::env::remove_var("STOCK_API_BASE_URL");
        std::env::set_var("STOCK_API_TIMEOUT_SECS", "not-a-number");

        let config = SearchClientConfig::from_env().unwrap();
        assert_eq!(config.base_url, "https://api.shutterstock.com");
        assert_eq!(config.timeout, Duration::from_secs(30));

        std::env::remove_var("STOCK_API_TOKEN");
        std::env::remove_var("STOCK_API_TIMEOUT_SECS");
    }

    #[tokio::test]
    async fn test_search_maps_results() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/images/search"))
            .and(header("authorization", "Bearer test-token"))
            .and(query_param("query", "sunset"))
            .and(query_param("image_type", "photo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body()))
            .expect(1)
            .mount(&server)
            .await;

        let assets = client_for(&server)
            .search(&SearchQuery::new("sunset").with_image_type("photo"))
            .await
            .unwrap();

        assert_eq!(assets.len(), 1);
        let asset = &assets[0];
        assert_eq!(asset.id.as_str(), "42");
        assert_eq!(asset.source_url, "https://img/42.jpg");
        assert_eq!(asset.contributor_id, "c1");
        assert!(asset.status.is_none());
        assert!(!asset.subclip_created);
    }

    #[tokio::test]
    async fn test_missing_data_is_upstream_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"page": 1})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .search(&SearchQuery::new("sunset"))
            .await
            .unwrap_err();
        assert!(err.is_upstream_unavailable());
    }

    #[tokio::test]
    async fn test_server_error_is_upstream_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .search(&SearchQuery::new("sunset"))
            .await
            .unwrap_err();
        assert!(err.is_upstream_unavailable());
    }

    #[tokio::test]
    async fn test_non_json_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .search(&SearchQuery::new("sunset"))
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_invalid_query_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_body()))
            .expect(0)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .search(&SearchQuery::new("  "))
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_upstream_unavailable() {
        let mut config = SearchClientConfig::new("t");
        config.base_url = "http://127.0.0.1:1".to_string();
        config.timeout = Duration::from_secs(2);
        let client = StockSearchClient::new(config).unwrap();

        let err = client.search(&SearchQuery::new("sunset")).await.unwrap_err();
        assert!(err.is_upstream_unavailable());
    }
}
