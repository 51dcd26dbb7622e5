//! Lifeboat CLI - lifeboat command
//!
//! Offline companion to the snapshot scheduler: finds snapshots left behind
//! by a crash and lets you inspect, recover or discard them.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;
mod diff_utils;
mod util;

/// Lifeboat - recover unsaved editor contents after a crash
#[derive(Parser)]
#[command(name = "lifeboat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List snapshots under a directory
    Scan {
        /// Directory to scan (default: current directory)
        dir: Option<PathBuf>,
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Show what a snapshot would change in its file
    Diff {
        /// The original file
        file: PathBuf,
        /// Number of context lines (default: 3)
        #[arg(short = 'U', long, default_value = "3")]
        context: usize,
    },
    /// Replace a file with its snapshot
    Recover {
        /// The original file
        file: PathBuf,
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Delete the snapshot of a file
    Discard {
        /// The original file
        file: PathBuf,
    },
    /// Delete every snapshot under a directory
    Clean {
        /// Directory to clean (default: current directory)
        dir: Option<PathBuf>,
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// View and edit configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// List all configuration values
    List,
    /// Print one configuration value
    Get {
        /// Key, e.g. naming.prefix
        key: String,
    },
    /// Set one configuration value
    Set {
        key: String,
        value: String,
    },
    /// Show the config file location
    Path {
        /// Create the file with defaults if missing
        #[arg(long)]
        create: bool,
    },
    /// Print an example configuration file
    Example,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan { dir, json } => cmd::scan::run(dir, json).await,
        Commands::Diff { file, context } => cmd::diff::run(&file, context).await,
        Commands::Recover { file, yes } => cmd::recover::run(&file, yes).await,
        Commands::Discard { file } => cmd::discard::run(&file).await,
        Commands::Clean { dir, yes } => cmd::clean::run(dir, yes).await,
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::List => cmd::config::run_list().await,
            ConfigCommands::Get { key } => cmd::config::run_get(&key).await,
            ConfigCommands::Set { key, value } => cmd::config::run_set(&key, &value).await,
            ConfigCommands::Path { create } => cmd::config::run_path(create).await,
            ConfigCommands::Example => cmd::config::run_example().await,
        },
    }
}
