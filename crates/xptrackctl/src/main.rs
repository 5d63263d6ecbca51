//! XP Track Control - CLI client for the XP Track daemon
//!
//! Registers characters, lists tracked progress, and prints derived
//! statistics fetched from xptrackd.

mod client;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use client::{DaemonClient, DEFAULT_ADDR};

#[derive(Parser)]
#[command(name = "xptrackctl")]
#[command(about = "XP Track - Tibia character experience tracker", long_about = None)]
#[command(version)]
struct Cli {
    /// Daemon address
    #[arg(long, env = "XPTRACK_ADDR", default_value = DEFAULT_ADDR)]
    addr: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show daemon health
    Status,

    /// Track a new character
    Add {
        /// Character name as it appears on the highscores
        name: String,

        /// Game world (e.g. "Etebra")
        #[arg(long)]
        world: String,

        /// Vocation in highscores plural form (e.g. "druids")
        #[arg(long)]
        vocation: String,
    },

    /// List tracked characters with their current summary
    List,

    /// Stop tracking a character
    Remove {
        /// Character name (case-insensitive)
        name: String,
    },

    /// Show full derived statistics for a character
    Stats {
        /// Character name (case-insensitive)
        name: String,
    },

    /// Trigger a collection cycle now
    Fetch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = DaemonClient::new(&cli.addr)?;

    match cli.command {
        Commands::Status => commands::status(&client).await,
        Commands::Add { name, world, vocation } => {
            commands::add(&client, name, world, vocation).await
        }
        Commands::List => commands::list(&client).await,
        Commands::Remove { name } => commands::remove(&client, &name).await,
        Commands::Stats { name } => commands::stats(&client, &name).await,
        Commands::Fetch => commands::fetch(&client).await,
    }
}
