//! Cycle command handlers
//!
//! Wires the configured collaborators into a cycle engine and runs it, either
//! forever on the poll interval or for a single cycle.

use anyhow::{Context, Result};
use colored::*;
use lookout_client::{MailClient, SearchClient};
use lookout_core::domain::cycle::{CycleResult, NotifyOutcome};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::Config;
use crate::repository::{
    CheckpointStore, FileCheckpointStore, HttpSearchSource, InMemoryCheckpointStore, LogNotifier,
    MailNotifier, Notifier,
};
use crate::scheduler::CyclePoller;
use crate::scheduler::poller::report;
use crate::service::CycleEngine;

/// Poll until Ctrl-C
pub async fn run(dry_run: bool) -> Result<()> {
    let config = load_config()?;
    let engine = Arc::new(build_engine(&config, dry_run).await?);

    let poller = CyclePoller::new(engine, config.poll_interval);
    poller.run(shutdown_on_ctrl_c()).await;

    Ok(())
}

/// Run one cycle and print the result
pub async fn once(dry_run: bool, json: bool) -> Result<()> {
    let config = load_config()?;
    let engine = build_engine(&config, dry_run).await?;

    let outcome = engine.run_cycle(&shutdown_on_ctrl_c()).await;
    report(&outcome);
    let result = outcome.context("Poll cycle failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_cycle_summary(&result);
    }

    Ok(())
}

/// Loads and validates configuration from the environment
fn load_config() -> Result<Config> {
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate()?;
    info!(
        "Loaded configuration: query='{}', recipients={}, checkpoint={}",
        config.query,
        config.recipients.len(),
        config.checkpoint_path.display()
    );
    Ok(config)
}

/// Builds the engine with HTTP collaborators
///
/// A dry run reads the real checkpoint once and then works on an in-memory
/// copy, and logs notifications instead of sending them.
async fn build_engine(config: &Config, dry_run: bool) -> Result<CycleEngine> {
    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let mut search_client = SearchClient::with_client(&config.search_url, http.clone());
    if let Some(token) = &config.search_token {
        search_client = search_client.with_bearer_token(token);
    }

    let file_store = FileCheckpointStore::new(&config.checkpoint_path);

    let (checkpoints, notifier): (Arc<dyn CheckpointStore>, Arc<dyn Notifier>) = if dry_run {
        let current = file_store
            .read()
            .await
            .context("Failed to read checkpoint for dry run")?;
        info!("Dry run: notifications are logged and the checkpoint is not updated");
        (
            Arc::new(InMemoryCheckpointStore::with_value(current)),
            Arc::new(LogNotifier),
        )
    } else {
        let api_key = config
            .mail_api_key
            .as_deref()
            .context("LOOKOUT_MAIL_API_KEY is required unless --dry-run is set")?;
        let mail_client = MailClient::with_client(&config.mail_url, api_key, http);
        (Arc::new(file_store), Arc::new(MailNotifier::new(mail_client)))
    };

    Ok(CycleEngine::new(
        config.cycle_config(),
        checkpoints,
        Arc::new(HttpSearchSource::new(search_client)),
        notifier,
    ))
}

/// Returns a token cancelled on Ctrl-C
fn shutdown_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl-C, shutting down");
                trigger.cancel();
            }
            Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    token
}

fn print_cycle_summary(result: &CycleResult) {
    println!("{}", "Cycle complete".bold());
    println!("  Previous watermark: {}", result.previous_watermark);
    println!("  New items:          {}", result.new_items);
    println!("  Watermark:          {}", result.watermark);
    println!("  Notification:       {}", describe_notify(&result.notify));
    println!(
        "  Persisted:          {}",
        if result.persisted { "yes" } else { "no" }
    );
}

fn describe_notify(outcome: &NotifyOutcome) -> ColoredString {
    match outcome {
        NotifyOutcome::NotAttempted => "not needed".dimmed(),
        NotifyOutcome::Accepted { detail } => format!("accepted ({})", detail).green(),
        NotifyOutcome::Rejected { detail } => format!("rejected ({})", detail).red(),
        NotifyOutcome::Failed { error } => format!("failed ({})", error).red(),
    }
}
