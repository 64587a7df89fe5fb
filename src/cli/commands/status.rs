//! Status command implementation.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use crate::error::Result;
use crate::storage::StorageUsage;
use crate::sync::SyncState;

use super::{format_bytes, open_coordinator};

/// Output for the status command.
#[derive(Serialize)]
struct StatusOutput {
    photos: usize,
    videos: usize,
    total: usize,
    bytes: i64,
    sync: SyncState,
}

/// Execute the status command.
///
/// Reports record counts, advisory storage usage, and the sync state.
/// Purely local: no remote call is made.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or queried.
pub fn execute(db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let coordinator = open_coordinator(db_path)?;
    let usage: StorageUsage = coordinator.usage()?;
    let state = coordinator.state();

    if json {
        let output = StatusOutput {
            photos: usage.photos,
            videos: usage.videos,
            total: usage.total(),
            bytes: usage.bytes,
            sync: state,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("{}", "Memkeep status".bold());
    println!();
    let mut counts = Vec::new();
    if usage.photos > 0 {
        counts.push(format!("{} photo(s)", usage.photos));
    }
    if usage.videos > 0 {
        counts.push(format!("{} video(s)", usage.videos));
    }
    if counts.is_empty() {
        println!("  No memories stored yet.");
    } else {
        println!("  Total: {}", counts.join(" · "));
        println!("  Storage: {}", format_bytes(usage.bytes));
    }
    println!("  Sync: {state}");

    Ok(())
}
