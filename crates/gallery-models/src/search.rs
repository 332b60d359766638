//! Structured search queries for the stock image provider.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};

/// Largest page the provider accepts.
pub const MAX_PER_PAGE: u32 = 500;

/// Result ordering supported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SearchSort {
    Popular,
    Newest,
    Relevance,
    Random,
}

/// Free-text term plus optional filters.
///
/// Serializes directly to the provider's query-string parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct SearchQuery {
    pub query: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SearchSort>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe: Option<bool>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_image_type(mut self, image_type: impl Into<String>) -> Self {
        self.image_type = Some(image_type.into());
        self
    }

    pub fn with_page(mut self, page: u32, per_page: u32) -> Self {
        self.page = Some(page);
        self.per_page = Some(per_page);
        self
    }

    /// Reject queries the provider would refuse anyway.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.query.trim().is_empty() {
            return Err(ValidationError::MissingField("query"));
        }
        if let Some(per_page) = self.per_page {
            if per_page == 0 || per_page > MAX_PER_PAGE {
                return Err(ValidationError::invalid(
                    "per_page",
                    format!("must be between 1 and {}", MAX_PER_PAGE),
                ));
            }
        }
        if self.page == Some(0) {
            return Err(ValidationError::invalid("page", "pages start at 1"));
        }
        Ok(())
    }
}
