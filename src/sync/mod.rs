//! Synchronization between the local store and the remote mirror.
//!
//! - **Merge**: pure reconciliation of two snapshots, remote-wins on id
//!   collision ([`merge`]).
//! - **Coordinator**: orchestrates initial load, manual sync, mutation
//!   propagation, and live reconciliation ([`SyncCoordinator`]).
//! - **State**: the observable status surface ([`SyncState`]).
//!
//! # Local-first guarantee
//!
//! Every mutation lands in the local store synchronously before any remote
//! interaction. Remote failures only ever change the status surface; they
//! never block or revert local writes.

mod coordinator;
mod merge;
mod state;

pub use coordinator::{Filter, ImportSummary, SyncCoordinator};
pub use merge::{merge, same_snapshot, sort_snapshot};
pub use state::SyncState;
