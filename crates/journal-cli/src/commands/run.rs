//! Run command: the editor host adapter.
//!
//! Events arrive on stdin, one JSON object per line:
//!
//! ```text
//! {"event":"opened","uri":"file:///src/app/main.rs","workspace_roots":["file:///src/app"]}
//! {"event":"saved","uri":"file:///src/app/main.rs","workspace_roots":["file:///src/app"]}
//! {"event":"closed","uri":"file:///src/app/main.rs","workspace_roots":["file:///src/app"]}
//! {"event":"force_sync"}
//! ```
//!
//! End of input or Ctrl-C shuts the journal down with a final sync.
//!
//! Stdin is read on a plain OS thread. A blocking read cannot be cancelled,
//! and the process must not wait for one after the service has stopped.

use std::io::BufRead;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use journal_core::config::SinkKind;
use journal_core::event::EditorEvent;
use journal_core::service::JournalService;

use super::{load_config, RunArgs};

/// Run the journal until stdin closes or the user interrupts.
pub async fn run(args: RunArgs) -> Result<()> {
    let mut config = load_config();

    if let Some(frequency) = args.frequency {
        config.sync.frequency_minutes = frequency;
    }
    if let Some(sink) = &args.sink {
        config.sync.sink = sink.parse::<SinkKind>()?;
    }

    let service =
        JournalService::from_config(&config).context("Failed to start the activity journal")?;

    let (tx, rx) = mpsc::channel(journal_core::DEFAULT_EVENT_CHANNEL_CAPACITY);

    let roots = args.workspace_root;
    let stdin_tx = tx.clone();
    std::thread::Builder::new()
        .name("journal-stdin".to_string())
        .spawn(move || {
            let forwarded = forward_events(std::io::stdin().lock(), &stdin_tx, &roots);
            tracing::debug!(forwarded, "Input closed");
            let _ = stdin_tx.blocking_send(EditorEvent::Shutdown);
        })
        .context("Failed to start the input reader")?;

    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, shutting down");
            let _ = tx.send(EditorEvent::Shutdown).await;
        }
    });

    let stats = service.run(rx).await;

    interrupt.abort();

    tracing::info!(
        events = stats.events,
        sessions = stats.sessions_finalized,
        synced = stats.sessions_synced,
        failed_syncs = stats.flushes_failed,
        "Activity journal stopped"
    );

    Ok(())
}

/// Parse event lines from `input` and send them to the service.
///
/// Blank lines are ignored and malformed lines are logged and skipped.
/// Returns the number of events forwarded.
///
/// Blocks the calling thread; never call it from inside the runtime.
fn forward_events<R: BufRead>(input: R, tx: &mpsc::Sender<EditorEvent>, roots: &[String]) -> usize {
    let mut forwarded = 0;

    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Failed to read editor events: {e}");
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let event = match EditorEvent::parse_line(&line) {
            Ok(event) => event.with_default_roots(roots),
            Err(e) => {
                tracing::warn!("Ignoring input line: {e}");
                continue;
            }
        };

        if tx.blocking_send(event).is_err() {
            break;
        }
        forwarded += 1;
    }

    forwarded
}
