//! Backup import/export codec.
//!
//! Backups are portable JSON documents: a single array of record objects
//! with no field omission. Import favors maximal recovery over strictness —
//! structurally broken documents abort before any mutation, but individual
//! malformed records are dropped and counted rather than failing the batch.

mod codec;
mod file;

pub use codec::{backup_file_name, export, import, ImportOutcome, BACKUP_PREFIX};
pub use file::{atomic_write, read_bytes};
