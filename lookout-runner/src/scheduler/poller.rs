//! Cycle poller
//!
//! Runs the cycle engine on every tick and logs the outcome. A failed cycle
//! never stops the poller; the next tick starts from whatever is persisted.

use lookout_core::domain::cycle::{CycleResult, NotifyOutcome};
use std::sync::Arc;
use tokio::time::{self, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::service::{CycleEngine, CycleError};

/// Poller that runs one cycle per interval tick
pub struct CyclePoller {
    engine: Arc<CycleEngine>,
    interval: Duration,
}

impl CyclePoller {
    /// Creates a new cycle poller
    pub fn new(engine: Arc<CycleEngine>, interval: Duration) -> Self {
        Self { engine, interval }
    }

    /// Starts the polling loop
    ///
    /// The first cycle runs immediately. Returns once `shutdown` is cancelled;
    /// a cycle in flight at that moment is aborted before it persists.
    pub async fn run(&self, shutdown: CancellationToken) {
        info!("Starting cycle poller (interval: {:?})", self.interval);

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("Poller received shutdown signal");
                    break;
                }
                _ = ticker.tick() => {}
            }

            debug!("Running poll cycle");
            let outcome = self.engine.run_cycle(&shutdown).await;
            report(&outcome);
        }

        info!("Cycle poller stopped");
    }
}

/// Logs the outcome of a cycle at a level matching its severity
pub fn report(outcome: &Result<CycleResult, CycleError>) {
    match outcome {
        Ok(result) if result.new_items == 0 => {
            debug!("No new items (watermark {})", result.watermark);
        }
        Ok(result) => match &result.notify {
            NotifyOutcome::Accepted { .. } => info!(
                "Notified about {} new item(s); watermark {} -> {}",
                result.new_items, result.previous_watermark, result.watermark
            ),
            NotifyOutcome::Rejected { detail } => warn!(
                "Delivery of {} new item(s) was rejected ({}); watermark {} -> {}",
                result.new_items, detail, result.previous_watermark, result.watermark
            ),
            NotifyOutcome::Failed { error } => warn!(
                "Delivery of {} new item(s) failed ({}); watermark {} -> {}",
                result.new_items, error, result.previous_watermark, result.watermark
            ),
            NotifyOutcome::NotAttempted => {}
        },
        Err(CycleError::Cancelled { stage }) => {
            info!("Cycle cancelled during {}", stage);
        }
        Err(e) => {
            error!("Error during poll cycle: {}", error_chain(e));
        }
    }
}

/// Formats an error followed by each of its causes
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{CycleConfig, NotifyFailurePolicy};
    use crate::testing::{RecordingCheckpointStore, RecordingNotifier, StaticSearchSource};
    use anyhow::anyhow;
    use lookout_core::domain::watermark::Watermark;

    #[tokio::test]
    async fn test_repeated_ticks_notify_once() {
        let store = Arc::new(RecordingCheckpointStore::with_value("100"));
        let source = Arc::new(StaticSearchSource::returning(&[101, 103, 102]));
        let notifier = Arc::new(RecordingNotifier::default());
        let engine = Arc::new(CycleEngine::new(
            CycleConfig {
                query: "#rustlang".to_string(),
                recipients: vec!["ops@example.com".to_string()],
                from_address: "lookout@example.com".to_string(),
                subject: "New results".to_string(),
                epoch_watermark: Watermark::EPOCH,
                notify_failure_policy: NotifyFailurePolicy::Advance,
            },
            store.clone(),
            source.clone(),
            notifier.clone(),
        ));

        let poller = CyclePoller::new(engine, Duration::from_millis(10));
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn({
            let shutdown = shutdown.clone();
            async move { poller.run(shutdown).await }
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown.cancel();
        handle.await.unwrap();

        assert!(source.call_count() >= 2);
        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.value().as_deref(), Some("103\n"));
    }

    #[tokio::test]
    async fn test_stops_immediately_when_already_cancelled() {
        let source = Arc::new(StaticSearchSource::returning(&[101]));
        let engine = Arc::new(CycleEngine::new(
            CycleConfig {
                query: "q".to_string(),
                recipients: vec!["ops@example.com".to_string()],
                from_address: "lookout@example.com".to_string(),
                subject: "s".to_string(),
                epoch_watermark: Watermark::EPOCH,
                notify_failure_policy: NotifyFailurePolicy::Advance,
            },
            Arc::new(RecordingCheckpointStore::default()),
            source.clone(),
            Arc::new(RecordingNotifier::default()),
        ));
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        CyclePoller::new(engine, Duration::from_secs(300))
            .run(shutdown)
            .await;

        assert_eq!(source.call_count(), 0);
    }

    #[test]
    fn test_error_chain_includes_causes() {
        let err = CycleError::SourceQuery(anyhow!("connection refused").context("Search request failed"));
        assert_eq!(
            error_chain(&err),
            "search query failed: Search request failed: connection refused"
        );
    }
}
