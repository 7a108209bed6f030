//! Lookout Runner
//!
//! Watches a search query and e-mails new results.
//!
//! Architecture:
//! - Configuration: Load settings from the environment
//! - Repositories: Checkpoint slot, search API and mail API behind traits
//! - Services: The poll cycle engine (filter, render, notify, persist)
//! - Scheduler: Runs one cycle per poll interval until shutdown
//!
//! Every cycle asks the search API for items newer than the stored
//! watermark, mails the ones not seen before and moves the watermark to the
//! newest id, so an item is reported at most once.

mod commands;
mod config;
mod repository;
mod scheduler;
mod service;

#[cfg(test)]
mod testing;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{Commands, handle_command};

#[derive(Parser)]
#[command(name = "lookout")]
#[command(about = "Watch a search query and e-mail new results", long_about = None)]
struct Cli {
    /// Log notifications instead of sending them and leave the checkpoint untouched
    #[arg(long, global = true, env = "LOOKOUT_DRY_RUN")]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lookout_runner=info,lookout_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    handle_command(cli.command.unwrap_or(Commands::Run), cli.dry_run).await
}
