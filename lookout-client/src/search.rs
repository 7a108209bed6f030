//! Search API client

use lookout_core::dto::search::SearchResponse;
use reqwest::Client;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::{handle_response, normalize_base_url};

/// HTTP client for the search API
#[derive(Debug, Clone)]
pub struct SearchClient {
    /// Base URL of the search API (e.g., "https://search.example.com")
    base_url: String,
    /// Optional bearer token sent with every request
    bearer_token: Option<String>,
    /// HTTP client instance
    client: Client,
}

impl SearchClient {
    /// Create a new search client
    ///
    /// # Example
    /// ```
    /// use lookout_client::SearchClient;
    ///
    /// let client = SearchClient::new("https://search.example.com/");
    /// assert_eq!(client.base_url(), "https://search.example.com");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new search client with a custom HTTP client
    ///
    /// Use this to configure timeouts, proxies or TLS settings.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            bearer_token: None,
            client,
        }
    }

    /// Attach a bearer token to every request
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Get the base URL of the search API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Search for items matching `query` with an id greater than `since_id`
    ///
    /// The API may still return older items; callers must filter.
    pub async fn search(&self, query: &str, since_id: u64) -> Result<SearchResponse> {
        if query.trim().is_empty() {
            return Err(ClientError::InvalidRequest(
                "search query cannot be empty".to_string(),
            ));
        }

        let url = format!("{}/search", self.base_url);
        let since = since_id.to_string();

        debug!("Searching {} for '{}' since {}", url, query, since);

        let mut request = self
            .client
            .get(&url)
            .query(&[("q", query), ("since_id", since.as_str())]);

        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        handle_response(response).await
    }
}
