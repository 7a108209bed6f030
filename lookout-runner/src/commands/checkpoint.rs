//! Checkpoint command handlers
//!
//! Lets an operator read the stored watermark and overwrite it, which is the
//! way out of a malformed checkpoint.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use lookout_core::domain::watermark::Watermark;
use tracing::warn;

use crate::config::checkpoint_path_from_env;
use crate::repository::{CheckpointStore, FileCheckpointStore};

/// Checkpoint subcommands
#[derive(Subcommand)]
pub enum CheckpointCommands {
    /// Print the stored watermark
    Show,
    /// Overwrite the stored watermark
    Set {
        /// New watermark (decimal item id)
        value: String,
    },
}

/// Handle checkpoint commands
pub async fn handle_checkpoint_command(command: CheckpointCommands) -> Result<()> {
    let store = FileCheckpointStore::new(checkpoint_path_from_env());

    match command {
        CheckpointCommands::Show => show_checkpoint(&store).await,
        CheckpointCommands::Set { value } => set_checkpoint(&store, &value).await,
    }
}

async fn show_checkpoint(store: &FileCheckpointStore) -> Result<()> {
    let path = store.path().display();

    match store.read().await? {
        None => {
            println!(
                "{}",
                format!("No checkpoint at {}; the next cycle starts from the epoch watermark.", path)
                    .yellow()
            );
        }
        Some(raw) => match Watermark::parse_checkpoint(&raw) {
            Ok(watermark) => {
                println!("Watermark: {}", watermark.to_string().bold());
                println!("  Path:    {}", path);
            }
            Err(e) => {
                println!(
                    "{}",
                    format!("Malformed checkpoint {:?}: {}", raw, e).red()
                );
                println!("Repair it with `lookout checkpoint set <value>`.");
                anyhow::bail!("checkpoint at {} is malformed", path);
            }
        },
    }

    Ok(())
}

async fn set_checkpoint(store: &FileCheckpointStore, value: &str) -> Result<()> {
    let watermark = Watermark::parse_checkpoint(value.trim())
        .with_context(|| format!("'{}' is not a valid watermark", value))?;

    // The slot is about to be replaced, so an unreadable one is no reason to stop
    let previous = match store.read().await {
        Ok(previous) => previous,
        Err(e) => {
            warn!("Could not read previous checkpoint: {:#}", e);
            None
        }
    };
    store.write(&watermark.to_checkpoint_text()).await?;

    println!("{}", format!("Checkpoint set to {}", watermark).green());
    if let Some(previous) = previous {
        println!("  Previous: {:?}", previous.trim_end());
    }

    Ok(())
}
