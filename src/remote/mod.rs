//! Remote mirror client.
//!
//! The remote mirror is a single addressable document holding the entire
//! record collection as one JSON array. There is no per-record addressing
//! and no schema versioning; `pull` and `push` move whole snapshots.
//!
//! Two implementations satisfy the same contract:
//! - [`HttpMirror`] talks to a document endpoint over HTTP and offers a
//!   polling-based change subscription.
//! - [`NullMirror`] is the capability-gated no-op used when no remote is
//!   configured, so the sync coordinator logic stays unconditional.

mod http;
mod null;

pub use http::HttpMirror;
pub use null::NullMirror;

use sha2::{Digest, Sha256};
use tokio::sync::watch;

use crate::error::Result;
use crate::model::Record;

/// Remote snapshot carried by the subscription channel.
///
/// `None` means the remote document does not exist yet.
pub type RemoteSnapshot = Option<Vec<Record>>;

/// Contract for a remote mirror of the record collection.
///
/// `pull` and `push` fail with [`crate::Error::Unreachable`] on transport
/// failure only — an empty or missing remote document is `Ok(None)`, never
/// an error.
pub trait Mirror {
    /// Whether a real remote is configured. The coordinator reports
    /// `LocalOnly` status when this is false.
    fn is_configured(&self) -> bool;

    /// Fetch the entire remote snapshot, or `None` if no remote data
    /// exists yet.
    fn pull(&self) -> impl Future<Output = Result<RemoteSnapshot>> + Send;

    /// Atomically replace the entire remote snapshot.
    fn push(&self, records: &[Record]) -> impl Future<Output = Result<()>> + Send;

    /// Register a persistent change listener.
    ///
    /// The receiver observes a new value whenever the remote snapshot
    /// changes, including changes made by this client. Implementations
    /// must survive transient disconnects (silently resuming) and must
    /// suppress no-op notifications where they can; the coordinator
    /// re-checks structural equality regardless.
    fn subscribe(&self) -> watch::Receiver<RemoteSnapshot>;
}

/// Runtime-selected mirror backend.
///
/// Lets binaries hold one concrete coordinator type whether or not a
/// remote is configured.
#[derive(Debug)]
pub enum MirrorKind {
    Http(HttpMirror),
    Null(NullMirror),
}

impl Mirror for MirrorKind {
    fn is_configured(&self) -> bool {
        match self {
            Self::Http(m) => m.is_configured(),
            Self::Null(m) => m.is_configured(),
        }
    }

    async fn pull(&self) -> Result<RemoteSnapshot> {
        match self {
            Self::Http(m) => m.pull().await,
            Self::Null(m) => m.pull().await,
        }
    }

    async fn push(&self, records: &[Record]) -> Result<()> {
        match self {
            Self::Http(m) => m.push(records).await,
            Self::Null(m) => m.push(records).await,
        }
    }

    fn subscribe(&self) -> watch::Receiver<RemoteSnapshot> {
        match self {
            Self::Http(m) => m.subscribe(),
            Self::Null(m) => m.subscribe(),
        }
    }
}

/// Content fingerprint of a snapshot, independent of record order.
///
/// Records are hashed in id order so the same set always produces the same
/// digest. Used by the polling subscription to detect change without
/// keeping the previous snapshot around.
#[must_use]
pub fn snapshot_fingerprint(records: &[Record]) -> String {
    let mut sorted: Vec<&Record> = records.iter().collect();
    sorted.sort_by_key(|r| r.id);

    let mut hasher = Sha256::new();
    for record in sorted {
        let json = serde_json::to_string(record).expect("record serialization should not fail");
        hasher.update(json.as_bytes());
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}
