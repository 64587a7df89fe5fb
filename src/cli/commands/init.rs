//! Initialize the local store.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use crate::config::resolve_db_path;
use crate::error::{Error, Result};
use crate::storage::RecordStore;

#[derive(Serialize)]
struct InitOutput {
    database: PathBuf,
}

/// Execute the init command.
///
/// Creates `~/.memkeep/data/memkeep.db` (or the `--db` override) and
/// applies the schema.
///
/// # Errors
///
/// Returns [`Error::AlreadyInitialized`] if the database exists and
/// `--force` was not given, or an I/O/database error on failure.
pub fn execute(force: bool, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let db_path = resolve_db_path(db_path.map(PathBuf::as_path)).ok_or_else(|| {
        Error::Config("Could not determine the Memkeep data directory".to_string())
    })?;

    if db_path.exists() && !force {
        return Err(Error::AlreadyInitialized { path: db_path });
    }

    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)?;
    }
    if force && db_path.exists() {
        fs::remove_file(&db_path)?;
    }

    // Opening applies the schema.
    drop(RecordStore::open(&db_path)?);

    if json {
        let output = InitOutput {
            database: db_path,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Initialized Memkeep store at {}", db_path.display());
        println!("Set MK_REMOTE_URL or ~/.memkeep/config.json to enable remote mirroring.");
    }

    Ok(())
}
