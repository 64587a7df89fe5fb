//! No-op mirror for local-only operation.

use tokio::sync::watch;

use super::{Mirror, RemoteSnapshot};
use crate::error::Result;
use crate::model::Record;

/// Mirror used when no remote is configured.
///
/// Satisfies the full [`Mirror`] contract: `pull` reports "no remote data
/// yet", `push` succeeds without effect, and the subscription never fires.
/// This keeps the sync coordinator free of remote-presence conditionals.
#[derive(Debug)]
pub struct NullMirror {
    // Held so subscribers stay connected to a channel that never updates.
    tx: watch::Sender<RemoteSnapshot>,
}

impl NullMirror {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }
}

impl Default for NullMirror {
    fn default() -> Self {
        Self::new()
    }
}

impl Mirror for NullMirror {
    fn is_configured(&self) -> bool {
        false
    }

    async fn pull(&self) -> Result<RemoteSnapshot> {
        Ok(None)
    }

    async fn push(&self, _records: &[Record]) -> Result<()> {
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<RemoteSnapshot> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_mirror_satisfies_the_contract() {
        let mirror = NullMirror::new();
        assert!(!mirror.is_configured());
        assert_eq!(mirror.pull().await.unwrap(), None);
        mirror.push(&[]).await.unwrap();

        let rx = mirror.subscribe();
        assert!(rx.borrow().is_none());
    }
}
