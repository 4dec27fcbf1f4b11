use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "issuesync")]
#[command(author, version, about = "Copy the weekly audio edition onto a removable player")]
#[command(subcommand_precedence_over_arg = true)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Archive to sync (defaults to the newest one in the download directory)
    pub archive: Option<PathBuf>,

    /// Show what would be written without touching the device
    #[arg(long)]
    pub dry_run: bool,

    /// Print the dry-run manifest as JSON
    #[arg(long, requires = "dry_run")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
