//! Manual sync and live watch commands.

use std::path::PathBuf;

use colored::Colorize;
use tracing::info;

use crate::error::Result;
use crate::sync::SyncState;

use super::open_coordinator;

/// Execute the sync command: pull, merge, persist, push.
///
/// # Errors
///
/// Returns an error only on local store failure; an unreachable remote is
/// reported as `offline` status with exit code 0, because the local data
/// is intact.
pub async fn execute(db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut coordinator = open_coordinator(db_path)?;
    let state = coordinator.sync_now().await?;
    let total = coordinator.list_all().len();

    if json {
        println!(
            "{}",
            serde_json::json!({ "sync": state, "records": total })
        );
    } else {
        match &state {
            SyncState::LocalOnly => {
                println!("No remote mirror configured; nothing to sync.");
                println!("Set MK_REMOTE_URL or ~/.memkeep/config.json to enable mirroring.");
            }
            SyncState::Offline => {
                println!("{}: remote mirror unreachable.", "offline".red());
                println!("Local data is intact; run `mk sync` again later.");
            }
            state => {
                println!("{} — {total} record(s)", state.to_string().green());
            }
        }
    }

    Ok(())
}

/// Execute the watch command: reconcile once, then follow remote changes
/// until interrupted.
///
/// # Errors
///
/// Returns an error if applying a remote change to the local store fails.
pub async fn execute_watch(db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let mut coordinator = open_coordinator(db_path)?;

    coordinator.initial_load().await?;
    let state = coordinator.state();

    if matches!(state, SyncState::LocalOnly) {
        if json {
            println!("{}", serde_json::json!({ "sync": state }));
        } else {
            println!("No remote mirror configured; nothing to watch.");
        }
        return Ok(());
    }

    if !json {
        println!(
            "Watching remote mirror ({} record(s) after initial load). Ctrl-C to stop.",
            coordinator.list_all().len()
        );
    }
    info!("live reconciliation started");

    coordinator.watch_remote().await
}
