//! CLI command definitions and handlers.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Load configuration with graceful fallback to defaults.
///
/// A missing or unreadable config file is not fatal; the journal runs with
/// defaults and logs the problem.
pub fn load_config() -> journal_core::config::Config {
    journal_core::config::Config::load().unwrap_or_else(|e| {
        tracing::warn!("Using default configuration: {e}");
        journal_core::config::Config::default()
    })
}

pub mod config;
pub mod history;
pub mod report;
pub mod run;

/// Activity Journal - per-file editor sessions, synced on a timer
#[derive(Parser)]
#[command(name = "journal")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand)]
pub enum Command {
    /// Track editor events from stdin and sync sessions periodically
    Run(RunArgs),

    /// Replay events and print the resulting journal without syncing
    Report(ReportArgs),

    /// Manage configuration
    Config(ConfigArgs),

    /// View sync history
    History(HistoryArgs),
}

/// Arguments for the run command
#[derive(Parser)]
pub struct RunArgs {
    /// Minutes between syncs (overrides sync.frequency_minutes)
    #[arg(short, long)]
    pub frequency: Option<u64>,

    /// Sink to export to: log, http, github or file (overrides sync.sink)
    #[arg(short, long)]
    pub sink: Option<String>,

    /// Workspace root for events that carry none (can be repeated)
    #[arg(short = 'w', long = "workspace-root", action = clap::ArgAction::Append)]
    pub workspace_root: Vec<String>,
}

/// Arguments for the report command
#[derive(Parser)]
pub struct ReportArgs {
    /// File with one event per line (defaults to stdin)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Workspace root for events that carry none (can be repeated)
    #[arg(short = 'w', long = "workspace-root", action = clap::ArgAction::Append)]
    pub workspace_root: Vec<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the config command
#[derive(Parser)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Configuration key (e.g. sync.frequency_minutes)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,

        /// Value to set
        value: String,
    },

    /// Show all configuration
    Show,

    /// List all available configuration keys
    List,

    /// Show the configuration file path
    Path,

    /// Reset to defaults
    Reset,
}

/// Arguments for the history command
#[derive(Parser)]
pub struct HistoryArgs {
    /// Show at most this many entries
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Clear history
    #[arg(long)]
    pub clear: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
