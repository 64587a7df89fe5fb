//! Configuration management.
//!
//! Memkeep keeps everything under one per-user directory:
//! - **Database**: `~/.memkeep/data/memkeep.db`
//! - **Config**: `~/.memkeep/config.json` (remote mirror settings)
//!
//! A remote mirror is strictly optional; without one the coordinator runs
//! in local-only mode against the same store.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default subscription poll interval when the config doesn't set one.
const DEFAULT_POLL_SECS: u64 = 5;

/// Get the per-user Memkeep directory (`~/.memkeep`).
#[must_use]
pub fn memkeep_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().join(".memkeep"))
}

/// Resolve the database path.
///
/// An explicit override (CLI `--db` / `MK_DB`) wins; otherwise the global
/// location `~/.memkeep/data/memkeep.db` is used.
#[must_use]
pub fn resolve_db_path(override_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        return Some(path.to_path_buf());
    }
    memkeep_dir().map(|dir| dir.join("data").join("memkeep.db"))
}

/// Remote mirror settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Document URL holding the mirrored record array.
    pub remote_url: String,
    /// Seconds between subscription polls.
    #[serde(default = "default_poll_secs")]
    pub poll_interval_secs: u64,
}

const fn default_poll_secs() -> u64 {
    DEFAULT_POLL_SECS
}

impl RemoteConfig {
    /// Poll interval as a [`Duration`].
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Load the remote mirror configuration, if any.
///
/// Resolution order:
/// 1. `MK_REMOTE_URL` environment variable (interval from
///    `MK_POLL_SECS`, defaulting to 5)
/// 2. `config.json` in the Memkeep directory
/// 3. `None` — run local-only
///
/// # Errors
///
/// Returns [`Error::Config`] if a config file exists but cannot be parsed.
pub fn load_remote_config(base_dir: Option<&Path>) -> Result<Option<RemoteConfig>> {
    if let Ok(url) = std::env::var("MK_REMOTE_URL") {
        if !url.is_empty() {
            let poll_interval_secs = std::env::var("MK_POLL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_POLL_SECS);
            return Ok(Some(RemoteConfig {
                remote_url: url,
                poll_interval_secs,
            }));
        }
    }

    let dir = match base_dir {
        Some(dir) => dir.to_path_buf(),
        None => match memkeep_dir() {
            Some(dir) => dir,
            None => return Ok(None),
        },
    };

    let config_path = dir.join("config.json");
    if !config_path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&config_path)?;
    let config: RemoteConfig = serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("invalid {}: {e}", config_path.display())))?;
    Ok(Some(config))
}
