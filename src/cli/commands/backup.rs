//! Backup export/import commands.

use std::env;
use std::path::PathBuf;

use chrono::Local;

use crate::backup::{BACKUP_PREFIX, atomic_write, backup_file_name, read_bytes};
use crate::error::{Error, Result};

use super::open_coordinator;

/// Execute the export command.
///
/// Writes the full record set to
/// `<dir>/memkeep-backup-<date>-<time>.json` atomically.
///
/// # Errors
///
/// Returns an error if there is nothing to export or the file cannot be
/// written.
pub fn execute_export(output: Option<&PathBuf>, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let coordinator = open_coordinator(db_path)?;

    let count = coordinator.list_all().len();
    if count == 0 {
        return Err(Error::InvalidArgument(
            "nothing to export; the store is empty".to_string(),
        ));
    }

    let document = coordinator.export_all()?;

    let dir = match output {
        Some(dir) => dir.clone(),
        None => env::current_dir()?,
    };
    let path = dir.join(backup_file_name(BACKUP_PREFIX, Local::now()));
    atomic_write(&path, &document)?;

    if json {
        println!(
            "{}",
            serde_json::json!({ "path": path, "records": count })
        );
    } else {
        println!("Exported {count} record(s) to {}", path.display());
    }

    Ok(())
}

/// Execute the import command.
///
/// Decodes the backup document and merges it into the current set with
/// the import in the remote (winning) role, then pushes if sync is
/// active. Malformed documents abort before any mutation.
///
/// # Errors
///
/// Returns [`Error::InvalidFormat`] for malformed documents, or a store
/// error if persisting the merge fails.
pub async fn execute_import(file: &PathBuf, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let bytes = read_bytes(file)?;

    let mut coordinator = open_coordinator(db_path)?;
    let summary = coordinator.import_merge(&bytes).await?;

    if json {
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        println!("Restore complete:");
        println!("  Imported: {} record(s)", summary.imported);
        println!("  Added:    {} new", summary.added);
        if summary.dropped > 0 {
            println!("  Dropped:  {} malformed record(s)", summary.dropped);
        }
        println!("  Total now: {}", summary.total);
        if coordinator.state().is_offline() {
            println!("Remote mirror unreachable; the merge is stored locally.");
        }
    }

    Ok(())
}
