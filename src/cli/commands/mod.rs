//! Command implementations.

pub mod add;
pub mod backup;
pub mod completions;
pub mod init;
pub mod list;
pub mod rm;
pub mod status;
pub mod sync;
pub mod version;

use std::path::PathBuf;

use crate::config::{load_remote_config, resolve_db_path};
use crate::error::{Error, Result};
use crate::remote::{HttpMirror, MirrorKind, NullMirror};
use crate::storage::RecordStore;
use crate::sync::SyncCoordinator;

/// Open the store and build a coordinator with the configured mirror.
///
/// The mirror comes from `MK_REMOTE_URL` or `~/.memkeep/config.json`;
/// without either, a no-op mirror keeps the coordinator local-only.
pub(crate) fn open_coordinator(
    db_path: Option<&PathBuf>,
) -> Result<SyncCoordinator<MirrorKind>> {
    let db_path = resolve_db_path(db_path.map(PathBuf::as_path)).ok_or(Error::NotInitialized)?;
    if !db_path.exists() {
        return Err(Error::NotInitialized);
    }

    let store = RecordStore::open(&db_path)?;
    let mirror = match load_remote_config(None)? {
        Some(config) => MirrorKind::Http(HttpMirror::with_poll_interval(
            config.remote_url.clone(),
            config.poll_interval(),
        )),
        None => MirrorKind::Null(NullMirror::new()),
    };

    SyncCoordinator::new(store, mirror)
}

/// Human-readable byte count, e.g. `2.31 MB`.
pub(crate) fn format_bytes(bytes: i64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes.max(0) as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} {}", UNITS[0])
    } else {
        format!("{value:.2} {}", UNITS[unit])
    }
}

/// Format a Unix-millisecond timestamp for table output.
pub(crate) fn format_timestamp(millis: i64) -> String {
    use chrono::{Local, TimeZone};
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map_or_else(|| millis.to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string())
}
