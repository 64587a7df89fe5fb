//! Local record store.
//!
//! SQLite-backed durable storage for records. This is the sole source of
//! truth when no remote mirror is configured or reachable.

pub mod schema;
pub mod sqlite;

pub use sqlite::{RecordStore, StorageUsage};
