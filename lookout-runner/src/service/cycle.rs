//! Poll cycle engine
//!
//! One cycle reads the watermark, queries the search source, keeps only items
//! newer than the watermark, notifies about them and persists the advanced
//! watermark. Each call to [`CycleEngine::run_cycle`] is independent; nothing
//! is carried over in memory between cycles.
//!
//! Notify failures are recorded in the [`CycleResult`] rather than returned as
//! errors. With [`NotifyFailurePolicy::Advance`] (the default) the watermark is
//! persisted anyway, so a failed delivery is not retried and its items are
//! never reported. With [`NotifyFailurePolicy::Hold`] the watermark stays put
//! and the next cycle sends the same items again.
//!
//! Concurrent cycles against the same checkpoint are not guarded against here.
//! The scheduler must run at most one at a time.

use anyhow::anyhow;
use lookout_core::domain::cycle::{CycleResult, CycleStage, NotifyOutcome};
use lookout_core::domain::item::Item;
use lookout_core::domain::notification::Notification;
use lookout_core::domain::watermark::Watermark;
use std::future::Future;
use std::num::ParseIntError;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::repository::{CheckpointStore, Notifier, SearchSource};
use crate::service::{FilterOutcome, filter_new_items, render_items};

/// What to do with the watermark when delivery fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotifyFailurePolicy {
    /// Persist the new watermark anyway; the failed items are not re-sent
    #[default]
    Advance,
    /// Keep the old watermark; the next cycle re-sends the same items
    Hold,
}

impl FromStr for NotifyFailurePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "advance" => Ok(Self::Advance),
            "hold" => Ok(Self::Hold),
            other => Err(anyhow!(
                "unknown notify failure policy '{}' (expected 'advance' or 'hold')",
                other
            )),
        }
    }
}

/// Settings a cycle needs besides its collaborators
#[derive(Debug, Clone)]
pub struct CycleConfig {
    /// Query sent to the search source
    pub query: String,
    /// Notification recipients
    pub recipients: Vec<String>,
    /// Notification sender
    pub from_address: String,
    /// Notification subject line
    pub subject: String,
    /// Watermark used when the checkpoint store is empty
    pub epoch_watermark: Watermark,
    pub notify_failure_policy: NotifyFailurePolicy,
}

/// Reasons a cycle ends without completing
#[derive(Debug, Error)]
pub enum CycleError {
    /// Stored checkpoint is not a decimal u64. Needs an operator; defaulting
    /// would re-report every historical item.
    #[error("checkpoint content {raw:?} is not a valid watermark")]
    MalformedCheckpoint {
        raw: String,
        #[source]
        source: ParseIntError,
    },

    #[error("failed to read checkpoint")]
    CheckpointRead(#[source] anyhow::Error),

    /// Search failed; the watermark is untouched and the next tick retries
    #[error("search query failed")]
    SourceQuery(#[source] anyhow::Error),

    /// New watermark was not stored; the next cycle re-derives it
    #[error("failed to persist watermark {watermark}")]
    CheckpointWrite {
        watermark: Watermark,
        #[source]
        source: anyhow::Error,
    },

    #[error("cycle cancelled during {stage}")]
    Cancelled { stage: CycleStage },
}

/// Runs poll cycles against a checkpoint store, search source and notifier
pub struct CycleEngine {
    config: CycleConfig,
    checkpoints: Arc<dyn CheckpointStore>,
    source: Arc<dyn SearchSource>,
    notifier: Arc<dyn Notifier>,
}

impl CycleEngine {
    /// Creates a new engine
    pub fn new(
        config: CycleConfig,
        checkpoints: Arc<dyn CheckpointStore>,
        source: Arc<dyn SearchSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            checkpoints,
            source,
            notifier,
        }
    }

    /// Runs one full cycle
    ///
    /// If `cancel` fires before the watermark is persisted, the cycle stops
    /// with [`CycleError::Cancelled`] and nothing is written.
    pub async fn run_cycle(&self, cancel: &CancellationToken) -> Result<CycleResult, CycleError> {
        let span = info_span!("cycle", cycle_id = %Uuid::new_v4());
        self.run_stages(cancel).instrument(span).await
    }

    async fn run_stages(&self, cancel: &CancellationToken) -> Result<CycleResult, CycleError> {
        let previous = self.read_watermark(cancel).await?;

        info!(
            "Querying for '{}' starting at since_id {}",
            self.config.query, previous
        );
        let candidates = until_cancelled(
            cancel,
            CycleStage::Query,
            self.source.search(&self.config.query, previous.get()),
        )
        .await?
        .map_err(CycleError::SourceQuery)?;

        debug!(stage = %CycleStage::Filter, "Filtering {} candidate(s)", candidates.len());
        let FilterOutcome {
            items,
            next_watermark,
        } = filter_new_items(previous, candidates);

        if items.is_empty() {
            info!("Query returned no new results");
            return Ok(CycleResult {
                previous_watermark: previous,
                watermark: previous,
                new_items: 0,
                notify: NotifyOutcome::NotAttempted,
                persisted: false,
            });
        }

        info!("Query returned {} new result(s)", items.len());

        let notification = self.build_notification(&items);
        let notify = self.notify(cancel, &notification).await?;

        if notify.is_failure() && self.config.notify_failure_policy == NotifyFailurePolicy::Hold {
            warn!(
                "Holding watermark at {} after failed delivery; {} item(s) will be re-sent",
                previous,
                items.len()
            );
            return Ok(CycleResult {
                previous_watermark: previous,
                watermark: previous,
                new_items: items.len(),
                notify,
                persisted: false,
            });
        }

        let persisted = self.persist(cancel, previous, next_watermark).await?;

        Ok(CycleResult {
            previous_watermark: previous,
            watermark: next_watermark,
            new_items: items.len(),
            notify,
            persisted,
        })
    }

    async fn read_watermark(&self, cancel: &CancellationToken) -> Result<Watermark, CycleError> {
        let raw = until_cancelled(cancel, CycleStage::ReadCheckpoint, self.checkpoints.read())
            .await?
            .map_err(CycleError::CheckpointRead)?;

        match raw {
            None => {
                info!(
                    "No checkpoint found, starting from {}",
                    self.config.epoch_watermark
                );
                Ok(self.config.epoch_watermark)
            }
            Some(raw) => Watermark::parse_checkpoint(&raw)
                .map_err(|source| CycleError::MalformedCheckpoint { raw, source }),
        }
    }

    fn build_notification(&self, items: &[Item]) -> Notification {
        Notification {
            subject: self.config.subject.clone(),
            from: self.config.from_address.clone(),
            recipients: self.config.recipients.clone(),
            body: render_items(items),
        }
    }

    async fn notify(
        &self,
        cancel: &CancellationToken,
        notification: &Notification,
    ) -> Result<NotifyOutcome, CycleError> {
        info!(
            "Sending '{}' to {} recipient(s)",
            notification.subject,
            notification.recipients.len()
        );

        let outcome = match until_cancelled(
            cancel,
            CycleStage::Notify,
            self.notifier.send(notification),
        )
        .await?
        {
            Ok(report) if report.accepted => NotifyOutcome::Accepted {
                detail: report.status_detail,
            },
            Ok(report) => {
                error!("Notification was not accepted: {}", report.status_detail);
                NotifyOutcome::Rejected {
                    detail: report.status_detail,
                }
            }
            Err(e) => {
                error!("Notification failed: {:#}", e);
                NotifyOutcome::Failed {
                    error: format!("{:#}", e),
                }
            }
        };

        Ok(outcome)
    }

    async fn persist(
        &self,
        cancel: &CancellationToken,
        previous: Watermark,
        next: Watermark,
    ) -> Result<bool, CycleError> {
        if next == previous {
            return Ok(false);
        }

        if cancel.is_cancelled() {
            return Err(CycleError::Cancelled {
                stage: CycleStage::PersistWatermark,
            });
        }

        // Not raced against cancellation: once started, the replace completes.
        self.checkpoints
            .write(&next.to_checkpoint_text())
            .await
            .map_err(|source| CycleError::CheckpointWrite {
                watermark: next,
                source,
            })?;

        info!("Watermark advanced from {} to {}", previous, next);
        Ok(true)
    }
}

/// Awaits `fut` unless `cancel` fires first
async fn until_cancelled<F: Future>(
    cancel: &CancellationToken,
    stage: CycleStage,
    fut: F,
) -> Result<F::Output, CycleError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!("Cancelled during {}", stage);
            Err(CycleError::Cancelled { stage })
        }
        output = fut => Ok(output),
    }
}
