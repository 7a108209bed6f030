//! Runner configuration
//!
//! Defines every configurable parameter of the watcher: what to search for,
//! who to notify, where the remote services and the checkpoint live, and how
//! often to poll.

use anyhow::{Context, anyhow};
use lookout_core::domain::watermark::Watermark;
use std::path::PathBuf;
use std::time::Duration;

use crate::service::{CycleConfig, NotifyFailurePolicy};

const DEFAULT_SUBJECT: &str = "New search results";
const DEFAULT_MAIL_URL: &str = "https://api.sendgrid.com";
const DEFAULT_CHECKPOINT_PATH: &str = "lookout/checkpoint.txt";

/// Runner configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Search query to watch
    pub query: String,

    /// Addresses that receive notifications
    pub recipients: Vec<String>,

    /// Sender address for notifications
    pub from_address: String,

    /// Subject line for notifications
    pub subject: String,

    /// Search API base URL (e.g., "https://search.example.com")
    pub search_url: String,

    /// Bearer token for the search API
    pub search_token: Option<String>,

    /// Mail-send API base URL
    pub mail_url: String,

    /// API key for the mail-send API; not needed for dry runs
    pub mail_api_key: Option<String>,

    /// File holding the watermark checkpoint
    pub checkpoint_path: PathBuf,

    /// How often to run a cycle
    pub poll_interval: Duration,

    /// Timeout applied to each HTTP request
    pub request_timeout: Duration,

    /// Watermark used before any checkpoint exists
    pub epoch_watermark: Watermark,

    pub notify_failure_policy: NotifyFailurePolicy,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - LOOKOUT_QUERY (required)
    /// - LOOKOUT_RECIPIENTS (required, comma-separated)
    /// - LOOKOUT_FROM (required)
    /// - LOOKOUT_SEARCH_URL (required)
    /// - LOOKOUT_SEARCH_TOKEN (optional)
    /// - LOOKOUT_SUBJECT (optional, default: "New search results")
    /// - LOOKOUT_MAIL_URL (optional, default: https://api.sendgrid.com)
    /// - LOOKOUT_MAIL_API_KEY (optional here, required to send mail)
    /// - LOOKOUT_CHECKPOINT_PATH (optional, default: lookout/checkpoint.txt)
    /// - LOOKOUT_POLL_INTERVAL (optional, seconds, default: 300)
    /// - LOOKOUT_REQUEST_TIMEOUT (optional, seconds, default: 30)
    /// - LOOKOUT_EPOCH_WATERMARK (optional, default: 981588894067118080)
    /// - LOOKOUT_NOTIFY_FAILURE (optional, "advance" or "hold", default: advance)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow!("{} environment variable not set", key))
        };
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let query = required("LOOKOUT_QUERY")?;
        let recipients = parse_recipients(&required("LOOKOUT_RECIPIENTS")?);
        let from_address = required("LOOKOUT_FROM")?;
        let search_url = required("LOOKOUT_SEARCH_URL")?;

        let subject = optional("LOOKOUT_SUBJECT").unwrap_or_else(|| DEFAULT_SUBJECT.to_string());
        let mail_url = optional("LOOKOUT_MAIL_URL").unwrap_or_else(|| DEFAULT_MAIL_URL.to_string());

        let checkpoint_path = checkpoint_path_from(&lookup);

        let poll_interval = optional("LOOKOUT_POLL_INTERVAL")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(300)); // 5 minutes

        let request_timeout = optional("LOOKOUT_REQUEST_TIMEOUT")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        // A bad epoch or policy changes what gets reported, so these fail loudly
        let epoch_watermark = match optional("LOOKOUT_EPOCH_WATERMARK") {
            Some(raw) => Watermark::parse_checkpoint(raw.trim())
                .with_context(|| format!("LOOKOUT_EPOCH_WATERMARK '{}' is not a u64", raw))?,
            None => Watermark::EPOCH,
        };

        let notify_failure_policy = match optional("LOOKOUT_NOTIFY_FAILURE") {
            Some(raw) => raw.parse::<NotifyFailurePolicy>()?,
            None => NotifyFailurePolicy::default(),
        };

        Ok(Self {
            query,
            recipients,
            from_address,
            subject,
            search_url,
            search_token: optional("LOOKOUT_SEARCH_TOKEN"),
            mail_url,
            mail_api_key: optional("LOOKOUT_MAIL_API_KEY"),
            checkpoint_path,
            poll_interval,
            request_timeout,
            epoch_watermark,
            notify_failure_policy,
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.query.trim().is_empty() {
            anyhow::bail!("query cannot be empty");
        }

        if self.recipients.is_empty() {
            anyhow::bail!("at least one recipient is required");
        }

        for address in self.recipients.iter().chain(std::iter::once(&self.from_address)) {
            if !address.contains('@') {
                anyhow::bail!("'{}' is not an e-mail address", address);
            }
        }

        for (name, url) in [("search_url", &self.search_url), ("mail_url", &self.mail_url)] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("{} must start with http:// or https://", name);
            }
        }

        if self.poll_interval.as_secs() == 0 {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.request_timeout.as_secs() == 0 {
            anyhow::bail!("request_timeout must be greater than 0");
        }

        Ok(())
    }

    /// Settings handed to the cycle engine
    pub fn cycle_config(&self) -> CycleConfig {
        CycleConfig {
            query: self.query.clone(),
            recipients: self.recipients.clone(),
            from_address: self.from_address.clone(),
            subject: self.subject.clone(),
            epoch_watermark: self.epoch_watermark,
            notify_failure_policy: self.notify_failure_policy,
        }
    }
}

/// Checkpoint file location, for commands that need nothing else
pub fn checkpoint_path_from_env() -> PathBuf {
    checkpoint_path_from(&|key: &str| std::env::var(key).ok())
}

fn checkpoint_path_from(lookup: &impl Fn(&str) -> Option<String>) -> PathBuf {
    lookup("LOOKOUT_CHECKPOINT_PATH")
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CHECKPOINT_PATH))
}

fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
