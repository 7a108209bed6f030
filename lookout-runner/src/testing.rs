//! In-memory collaborators for engine and poller tests

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use lookout_core::domain::item::Item;
use lookout_core::domain::notification::{DeliveryReport, Notification};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;

use crate::repository::{CheckpointStore, Notifier, SearchSource};

pub fn item(id: u64) -> Item {
    Item {
        id,
        created_at: Utc.timestamp_opt(1_522_800_000 + id as i64, 0).unwrap(),
        body: format!("body of item {}", id),
        urls: vec![format!("https://example.com/{}", id)],
    }
}

/// Checkpoint slot that records every write
#[derive(Default)]
pub struct RecordingCheckpointStore {
    pub slot: Mutex<Option<String>>,
    pub writes: Mutex<Vec<String>>,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl RecordingCheckpointStore {
    pub fn with_value(value: &str) -> Self {
        Self {
            slot: Mutex::new(Some(value.to_string())),
            ..Default::default()
        }
    }

    pub fn value(&self) -> Option<String> {
        self.slot.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }
}

#[async_trait]
impl CheckpointStore for RecordingCheckpointStore {
    async fn read(&self) -> Result<Option<String>> {
        if self.fail_reads {
            return Err(anyhow!("disk unavailable"));
        }
        Ok(self.value())
    }

    async fn write(&self, value: &str) -> Result<()> {
        if self.fail_writes {
            return Err(anyhow!("disk full"));
        }
        self.writes.lock().unwrap().push(value.to_string());
        *self.slot.lock().unwrap() = Some(value.to_string());
        Ok(())
    }
}

/// Search source returning a fixed result set
#[derive(Default)]
pub struct StaticSearchSource {
    pub items: Vec<Item>,
    pub fail: bool,
    pub hang: bool,
    pub calls: AtomicUsize,
    pub since_ids: Mutex<Vec<u64>>,
}

impl StaticSearchSource {
    pub fn returning(ids: &[u64]) -> Self {
        Self {
            items: ids.iter().copied().map(item).collect(),
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchSource for StaticSearchSource {
    async fn search(&self, _query: &str, since_id: u64) -> Result<Vec<Item>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.since_ids.lock().unwrap().push(since_id);
        if self.hang {
            std::future::pending::<()>().await;
        }
        if self.fail {
            return Err(anyhow!("connection refused"));
        }
        Ok(self.items.clone())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub enum NotifierMode {
    #[default]
    Accept,
    Reject,
    Fail,
}

/// Notifier that records what it was asked to send
#[derive(Default)]
pub struct RecordingNotifier {
    pub mode: NotifierMode,
    pub sent: Mutex<Vec<Notification>>,
    /// Cancelled once a notification has been recorded
    pub cancel_on_send: Option<CancellationToken>,
}

impl RecordingNotifier {
    pub fn with_mode(mode: NotifierMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> Result<DeliveryReport> {
        self.sent.lock().unwrap().push(notification.clone());
        if let Some(cancel) = &self.cancel_on_send {
            cancel.cancel();
        }
        match self.mode {
            NotifierMode::Accept => Ok(DeliveryReport::accepted("status 202")),
            NotifierMode::Reject => Ok(DeliveryReport::rejected("status 500: boom")),
            NotifierMode::Fail => Err(anyhow!("tls handshake failed")),
        }
    }
}
