//! Remove one memory, or clear the whole store.

use std::io::{self, Write};
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::sync::SyncState;

use super::open_coordinator;

/// Execute the rm command.
///
/// Removing a non-existent id is a quiet no-op: nothing changes and
/// nothing is pushed.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the delete fails.
pub async fn execute(id: i64, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut coordinator = open_coordinator(db_path)?;
    let removed = coordinator.remove(id).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "id": id, "removed": removed, "sync": coordinator.state() })
        );
    } else if removed {
        println!("Removed record {id}");
        if coordinator.state().is_offline() {
            println!("Remote mirror unreachable; removal will propagate on the next sync.");
        }
    } else {
        println!("No record with id {id}");
    }

    Ok(())
}

/// Execute the clear command.
///
/// In JSON mode (piped output) there is no interactive prompt, so `--yes`
/// is required; clearing must never happen silently just because stdout is
/// not a terminal.
///
/// # Errors
///
/// Returns an error if confirmation is missing in JSON mode, or if the
/// store cannot be opened or the clear fails.
pub async fn execute_clear(yes: bool, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut coordinator = open_coordinator(db_path)?;
    let total = coordinator.list_all().len();

    if !yes {
        if json {
            return Err(Error::InvalidArgument(
                "clearing the store needs --yes when output is not interactive".to_string(),
            ));
        }
        print!("Remove all {total} record(s), locally and remotely? [y/N] ");
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().read_line(&mut answer)?;
        if !matches!(answer.trim(), "y" | "Y" | "yes") {
            println!("Aborted.");
            return Ok(());
        }
    }

    coordinator.clear().await?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "cleared": total, "sync": coordinator.state() })
        );
    } else {
        println!("Cleared {total} record(s)");
        if matches!(coordinator.state(), SyncState::Offline) {
            println!("Remote mirror unreachable; the remote copy still holds the old data.");
        }
    }

    Ok(())
}
