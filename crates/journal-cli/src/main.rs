//! Activity Journal CLI - per-file editor sessions, synced on a timer
//!
//! The editor host pipes its document events into `journal run` as JSON
//! lines; finished sessions are exported every few minutes.
//!
//! ## Quick Start
//!
//! ```bash
//! # Track events from an editor host
//! my-editor-bridge | journal run --sink github
//!
//! # Preview what a batch of events would produce
//! journal report --input events.jsonl
//! ```

#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unused_async)]

use anyhow::Result;
use clap::Parser;

mod commands;

use commands::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(commands::load_config().general.enable_logging);

    match cli.command {
        Command::Run(args) => commands::run::run(args).await,
        Command::Report(args) => commands::report::run(args).await,
        Command::Config(args) => commands::config::run(args).await,
        Command::History(args) => commands::history::run(args).await,
    }
}

fn init_logging(enabled: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default_filter = if enabled {
        "warn,journal=info,journal_core=info"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
