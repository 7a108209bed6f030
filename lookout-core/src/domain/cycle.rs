//! Poll cycle domain types

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::watermark::Watermark;

/// Step of a poll cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleStage {
    ReadCheckpoint,
    Query,
    Filter,
    Notify,
    PersistWatermark,
}

impl fmt::Display for CycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CycleStage::ReadCheckpoint => "read-checkpoint",
            CycleStage::Query => "query",
            CycleStage::Filter => "filter",
            CycleStage::Notify => "notify",
            CycleStage::PersistWatermark => "persist-watermark",
        };
        f.write_str(name)
    }
}

/// Result of the notify step of a cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyOutcome {
    /// No new items, so nothing was sent
    NotAttempted,
    /// The transport explicitly accepted the message
    Accepted { detail: String },
    /// The transport answered but did not accept the message
    Rejected { detail: String },
    /// The transport call itself failed
    Failed { error: String },
}

impl NotifyOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Rejected { .. } | Self::Failed { .. })
    }
}

/// Outcome of one completed poll cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleResult {
    /// Watermark read at the start of the cycle
    pub previous_watermark: Watermark,
    /// Watermark at the end of the cycle (persisted or not)
    pub watermark: Watermark,
    /// Number of items newer than `previous_watermark`
    pub new_items: usize,
    pub notify: NotifyOutcome,
    /// Whether the checkpoint store was written this cycle
    pub persisted: bool,
}

impl CycleResult {
    pub fn notify_attempted(&self) -> bool {
        !matches!(self.notify, NotifyOutcome::NotAttempted)
    }

    pub fn notify_succeeded(&self) -> bool {
        matches!(self.notify, NotifyOutcome::Accepted { .. })
    }
}
