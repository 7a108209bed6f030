//! Commands module
//!
//! Defines the `lookout` subcommands and their handlers.

mod checkpoint;
mod cycle;

pub use checkpoint::CheckpointCommands;

use anyhow::Result;
use clap::Subcommand;

/// Top-level commands
#[derive(Subcommand)]
pub enum Commands {
    /// Poll on the configured interval until interrupted
    Run,
    /// Run a single poll cycle and print its result
    Once {
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Inspect or repair the stored watermark
    Checkpoint {
        #[command(subcommand)]
        command: CheckpointCommands,
    },
}

/// Handle a command
///
/// # Arguments
/// * `command` - The command to execute
/// * `dry_run` - Log notifications instead of sending them and leave the
///   stored checkpoint untouched
pub async fn handle_command(command: Commands, dry_run: bool) -> Result<()> {
    match command {
        Commands::Run => cycle::run(dry_run).await,
        Commands::Once { json } => cycle::once(dry_run, json).await,
        Commands::Checkpoint { command } => checkpoint::handle_checkpoint_command(command).await,
    }
}
