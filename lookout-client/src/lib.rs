//! Lookout HTTP Clients
//!
//! Thin, typed HTTP clients for the two remote services the watcher talks to:
//! - [`SearchClient`]: runs a query against the search API
//! - [`MailClient`]: submits a plain-text message to the mail-send API
//!
//! # Example
//!
//! ```no_run
//! use lookout_client::SearchClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = SearchClient::new("https://search.example.com")
//!         .with_bearer_token("secret");
//!
//!     let response = client.search("rust lang", 981588894067118080).await?;
//!     println!("Got {} result(s)", response.into_items().len());
//!     Ok(())
//! }
//! ```

pub mod error;
mod mail;
mod search;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use mail::{MailClient, SendReceipt};
pub use search::SearchClient;

use serde::de::DeserializeOwned;

/// Normalizes a base URL so endpoint paths can be appended with `/`
fn normalize_base_url(base_url: impl Into<String>) -> String {
    base_url.into().trim_end_matches('/').to_string()
}

/// Handle an API response and deserialize JSON
///
/// Checks the status code and returns an appropriate error if the request
/// failed, or deserializes the response body if successful.
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ClientError::api_error(status.as_u16(), error_text));
    }

    response
        .json()
        .await
        .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
}
