//! Mail-send API client

use lookout_core::dto::mail::SendMailRequest;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::normalize_base_url;

/// What the mail API answered to a send request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    /// HTTP status code
    pub status: u16,
    /// Response body, usually empty on success
    pub body: String,
}

impl SendReceipt {
    /// True only for `202 Accepted`, the status the API uses for a queued message
    pub fn is_accepted(&self) -> bool {
        self.status == StatusCode::ACCEPTED.as_u16()
    }
}

/// HTTP client for the mail-send API
#[derive(Debug, Clone)]
pub struct MailClient {
    /// Base URL of the mail API (e.g., "https://api.sendgrid.com")
    base_url: String,
    /// API key sent as a bearer token
    api_key: String,
    /// HTTP client instance
    client: Client,
}

impl MailClient {
    /// Create a new mail client
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(base_url, api_key, Client::new())
    }

    /// Create a new mail client with a custom HTTP client
    pub fn with_client(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        client: Client,
    ) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            api_key: api_key.into(),
            client,
        }
    }

    /// Get the base URL of the mail API
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit a message
    ///
    /// Any HTTP response is returned as a [`SendReceipt`]; only transport
    /// failures are errors. Callers decide what counts as delivered.
    pub async fn send(&self, req: &SendMailRequest) -> Result<SendReceipt> {
        if req.personalizations.iter().all(|p| p.to.is_empty()) {
            return Err(ClientError::InvalidRequest(
                "message has no recipients".to_string(),
            ));
        }

        let url = format!("{}/v3/mail/send", self.base_url);

        debug!("Sending mail '{}' via {}", req.subject, url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(req)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        Ok(SendReceipt { status, body })
    }
}
