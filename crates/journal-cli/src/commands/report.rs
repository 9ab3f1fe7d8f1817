//! Report command: replay events offline and print the journal.

use std::fs::File;
use std::io::{self, BufRead, BufReader};

use anyhow::{Context, Result};

use journal_core::clock::{Clock, SystemClock};
use journal_core::event::EditorEvent;
use journal_core::filter::SkipFilter;
use journal_core::report::JournalReport;
use journal_core::session::SessionTracker;

use super::{load_config, ReportArgs};

/// Run the report command.
pub async fn run(args: ReportArgs) -> Result<()> {
    let config = load_config();
    let filter = SkipFilter::new(&config.filter.exclude)?;
    let clock = std::sync::Arc::new(SystemClock);
    let mut tracker = SessionTracker::with_clock(clock.clone(), filter);

    let replayed = match &args.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Cannot open event file '{}'", path.display()))?;
            replay(BufReader::new(file), &mut tracker, &args.workspace_root)?
        }
        None => replay(io::stdin().lock(), &mut tracker, &args.workspace_root)?,
    };

    tracker.close_all();
    let report = JournalReport::from_batch(&tracker.finalized_snapshot(), clock.now());
    tracing::debug!(replayed, sessions = report.session_count(), "Events replayed");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_markdown());
    }

    Ok(())
}

/// Apply document events from `input` to `tracker`.
///
/// Sync and shutdown requests have no meaning offline and are ignored.
/// Returns the number of events applied.
fn replay<R: BufRead>(input: R, tracker: &mut SessionTracker, roots: &[String]) -> Result<usize> {
    let mut applied = 0;

    for (index, line) in input.lines().enumerate() {
        let line = line.context("Failed to read events")?;
        if line.trim().is_empty() {
            continue;
        }

        let event = match EditorEvent::parse_line(&line) {
            Ok(event) => event.with_default_roots(roots),
            Err(e) => {
                tracing::warn!(line = index + 1, "Skipping: {e}");
                continue;
            }
        };

        let (Some(project), Some(uri)) = (event.project(), event.uri()) else {
            continue;
        };

        match event {
            EditorEvent::Opened { .. } => {
                tracker.open(&project, uri);
            }
            EditorEvent::Saved { .. } => {
                tracker.save(&project, uri);
            }
            EditorEvent::Closed { .. } => {
                tracker.close(&project, uri);
            }
            EditorEvent::ForceSync | EditorEvent::Shutdown => continue,
        }
        applied += 1;
    }

    Ok(applied)
}
