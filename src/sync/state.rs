//! Sync status surface.

use chrono::{Local, TimeZone};
use serde::Serialize;

/// Observable state of the sync coordinator.
///
/// Transitions: `Idle → Syncing → {Synced, Offline}`, returning to `Idle`
/// only implicitly (the next operation starts from whatever state the last
/// one left). `LocalOnly` is terminal for the session: it means no remote
/// mirror is configured at all, which is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SyncState {
    /// No remote mirror configured; the local store is the whole world.
    LocalOnly,
    /// Remote configured, no sync in flight yet.
    Idle,
    /// A pull or push is in flight.
    Syncing,
    /// Last remote operation succeeded.
    Synced {
        /// Unix milliseconds of the last successful sync.
        at: i64,
    },
    /// Last remote operation failed; local mutations continue unaffected.
    Offline,
}

impl SyncState {
    /// Whether the last remote interaction failed.
    #[must_use]
    pub const fn is_offline(&self) -> bool {
        matches!(self, Self::Offline)
    }
}

impl std::fmt::Display for SyncState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LocalOnly => write!(f, "local-only"),
            Self::Idle => write!(f, "idle"),
            Self::Syncing => write!(f, "syncing"),
            Self::Synced { at } => {
                match Local.timestamp_millis_opt(*at).single() {
                    Some(when) => write!(f, "synced (last sync {})", when.format("%Y-%m-%d %H:%M:%S")),
                    None => write!(f, "synced"),
                }
            }
            Self::Offline => write!(f, "offline"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_state_tag() {
        let json = serde_json::to_value(SyncState::Synced { at: 1000 }).unwrap();
        assert_eq!(json["state"], "synced");
        assert_eq!(json["at"], 1000);

        let json = serde_json::to_value(SyncState::LocalOnly).unwrap();
        assert_eq!(json["state"], "local_only");
    }

    #[test]
    fn display_is_human_readable() {
        assert_eq!(SyncState::Offline.to_string(), "offline");
        assert_eq!(SyncState::LocalOnly.to_string(), "local-only");
        assert!(SyncState::Synced { at: 0 }.to_string().starts_with("synced"));
    }
}
