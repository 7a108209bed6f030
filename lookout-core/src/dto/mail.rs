//! Mail-send API DTOs
//!
//! Mirrors the SendGrid v3 `mail/send` body, restricted to the fields Lookout
//! fills in.

use serde::{Deserialize, Serialize};

use crate::domain::notification::Notification;

/// Request body for sending a single plain-text message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMailRequest {
    pub personalizations: Vec<Personalization>,
    pub from: EmailAddress,
    pub subject: String,
    pub content: Vec<MailContent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Personalization {
    pub to: Vec<EmailAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub value: String,
}

impl From<&Notification> for SendMailRequest {
    fn from(notification: &Notification) -> Self {
        let to = notification
            .recipients
            .iter()
            .map(|email| EmailAddress {
                email: email.clone(),
            })
            .collect();

        Self {
            personalizations: vec![Personalization { to }],
            from: EmailAddress {
                email: notification.from.clone(),
            },
            subject: notification.subject.clone(),
            content: vec![MailContent {
                content_type: "text/plain".to_string(),
                value: notification.body.clone(),
            }],
        }
    }
}
