//! Notification domain types

use serde::{Deserialize, Serialize};

/// A rendered notification ready for delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub subject: String,
    pub from: String,
    pub recipients: Vec<String>,
    pub body: String,
}

/// What the delivery transport reported back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReport {
    /// True only when the transport explicitly accepted the message
    pub accepted: bool,
    pub status_detail: String,
}

impl DeliveryReport {
    pub fn accepted(status_detail: impl Into<String>) -> Self {
        Self {
            accepted: true,
            status_detail: status_detail.into(),
        }
    }

    pub fn rejected(status_detail: impl Into<String>) -> Self {
        Self {
            accepted: false,
            status_detail: status_detail.into(),
        }
    }
}
