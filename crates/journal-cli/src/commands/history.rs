//! History command implementation.

use anyhow::Result;
use journal_core::history::SyncHistoryStore;

use super::{load_config, HistoryArgs};

/// Run the history command.
pub async fn run(args: HistoryArgs) -> Result<()> {
    let config = load_config();
    let mut store = SyncHistoryStore::load_with_config(config.history)?;

    if args.clear {
        store.clear()?;
        println!("History cleared.");
        return Ok(());
    }

    let entries = store.list(args.limit);

    if args.json {
        let output = serde_json::json!({
            "syncs": entries,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!();
    println!("Recent Syncs:");
    println!("{}", "─".repeat(68));
    println!(
        "  {:16}  {:9}  {:7}  {:8}  {:8}  {}",
        "Date", "Trigger", "Sink", "Sessions", "Projects", "Status"
    );
    println!("{}", "─".repeat(68));

    if entries.is_empty() {
        println!("  (no sync history)");
    }

    for entry in entries {
        let status = if entry.success { "ok" } else { "failed" };
        println!(
            "  {:16}  {:9}  {:7}  {:8}  {:8}  {}",
            entry.formatted_timestamp(),
            entry.trigger.to_string(),
            entry.sink,
            entry.sessions,
            entry.projects,
            status
        );
        if let Some(message) = &entry.error_message {
            println!("  {:16}  {}", "", message);
        }
    }

    println!("{}", "─".repeat(68));

    if let Some(last) = store.last_success() {
        println!("  Last successful sync: {}", last.formatted_timestamp());
    }

    Ok(())
}
