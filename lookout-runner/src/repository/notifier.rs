//! Notifier repository
//!
//! Delivers a rendered notification. Only an explicit acceptance from the
//! transport counts as delivered.

use anyhow::{Context, Result};
use async_trait::async_trait;
use lookout_client::MailClient;
use lookout_core::domain::notification::{DeliveryReport, Notification};
use lookout_core::dto::mail::SendMailRequest;
use tracing::info;

/// Repository trait for the notification transport
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Attempts delivery of `notification`
    ///
    /// Returns `Ok` with `accepted = false` when the transport answered but
    /// refused, and `Err` when the transport could not be reached at all.
    async fn send(&self, notification: &Notification) -> Result<DeliveryReport>;
}

/// Sends notifications as e-mail through the mail-send API
pub struct MailNotifier {
    client: MailClient,
}

impl MailNotifier {
    /// Creates a new mail notifier
    pub fn new(client: MailClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Notifier for MailNotifier {
    async fn send(&self, notification: &Notification) -> Result<DeliveryReport> {
        let request = SendMailRequest::from(notification);

        let receipt = self
            .client
            .send(&request)
            .await
            .context("Failed to submit mail")?;

        if receipt.is_accepted() {
            Ok(DeliveryReport::accepted(format!("status {}", receipt.status)))
        } else {
            Ok(DeliveryReport::rejected(format!(
                "status {}: {}",
                receipt.status, receipt.body
            )))
        }
    }
}

/// Writes notifications to the log instead of sending them
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<DeliveryReport> {
        info!(
            "[dry-run] would send '{}' from {} to {}:\n{}",
            notification.subject,
            notification.from,
            notification.recipients.join(", "),
            notification.body
        );
        Ok(DeliveryReport::accepted("logged"))
    }
}
