//! Search repository
//!
//! Fetches candidate items from the search API. The API is only trusted to
//! narrow results by `since_id`; the cycle engine still filters them.

use anyhow::{Context, Result};
use async_trait::async_trait;
use lookout_client::SearchClient;
use lookout_core::domain::item::Item;

/// Repository trait for the search API
#[async_trait]
pub trait SearchSource: Send + Sync {
    /// Returns candidate items for `query`, in any order
    ///
    /// # Arguments
    /// * `query` - The search query
    /// * `since_id` - Lower bound hint; items at or below it may still appear
    async fn search(&self, query: &str, since_id: u64) -> Result<Vec<Item>>;
}

/// HTTP implementation of SearchSource
pub struct HttpSearchSource {
    client: SearchClient,
}

impl HttpSearchSource {
    /// Creates a new HTTP search source
    pub fn new(client: SearchClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SearchSource for HttpSearchSource {
    async fn search(&self, query: &str, since_id: u64) -> Result<Vec<Item>> {
        let response = self
            .client
            .search(query, since_id)
            .await
            .with_context(|| format!("Search request to {} failed", self.client.base_url()))?;

        Ok(response.into_items())
    }
}
