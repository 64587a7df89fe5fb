//! The sync coordinator.
//!
//! Owns the local store handle, the remote mirror, and the in-memory cached
//! snapshot — there is no process-wide singleton; construct one coordinator
//! per store path. Consumers (the CLI layer) only ever read through it.
//!
//! Remote calls are best-effort: failures are converted to status updates
//! at this boundary and never roll back a local mutation. No background
//! retry loop exists; the next user action (a mutation or an explicit
//! `sync_now`) is the retry trigger. That is a deliberate
//! simplicity/availability trade-off for a single-operator tool.

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::backup;
use crate::error::{Error, Result};
use crate::model::{IdAllocator, MediaKind, Record};
use crate::remote::Mirror;
use crate::storage::{RecordStore, StorageUsage};
use crate::sync::merge::{merge, same_snapshot, sort_snapshot};
use crate::sync::state::SyncState;

/// Read-side filter over the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Every record.
    All,
    /// Video records only.
    Videos,
    /// Photos tagged with the given category.
    Category(String),
}

impl Filter {
    fn matches(&self, record: &Record) -> bool {
        match self {
            Self::All => true,
            Self::Videos => record.kind == MediaKind::Video,
            Self::Category(category) => record.category == *category,
        }
    }
}

/// Summary of an import operation.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ImportSummary {
    /// Records recovered from the backup document.
    pub imported: usize,
    /// Malformed entries dropped during decoding.
    pub dropped: usize,
    /// Records newly added to the store (imports that did not collide).
    pub added: usize,
    /// Total records after the merge.
    pub total: usize,
}

/// Orchestrates the local store and the remote mirror.
pub struct SyncCoordinator<M: Mirror> {
    store: RecordStore,
    mirror: M,
    ids: IdAllocator,
    snapshot: Vec<Record>,
    state_tx: watch::Sender<SyncState>,
}

impl<M: Mirror> SyncCoordinator<M> {
    /// Create a coordinator over an opened store and mirror.
    ///
    /// Loads the current snapshot and seeds the id allocator above every
    /// stored id, so ids imported from other devices can never collide
    /// with freshly allocated ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial snapshot cannot be read.
    pub fn new(store: RecordStore, mirror: M) -> Result<Self> {
        let snapshot = store.get_all()?;
        let ids = IdAllocator::new();
        for record in &snapshot {
            ids.observe(record.id);
        }

        let initial = if mirror.is_configured() {
            SyncState::Idle
        } else {
            SyncState::LocalOnly
        };
        let (state_tx, _) = watch::channel(initial);

        Ok(Self {
            store,
            mirror,
            ids,
            snapshot,
            state_tx,
        })
    }

    /// Current sync state.
    #[must_use]
    pub fn state(&self) -> SyncState {
        self.state_tx.borrow().clone()
    }

    /// Subscribe to sync-state changes.
    #[must_use]
    pub fn state_watch(&self) -> watch::Receiver<SyncState> {
        self.state_tx.subscribe()
    }

    fn set_state(&self, state: SyncState) {
        debug!(state = %state, "sync state");
        self.state_tx.send_replace(state);
    }

    fn mark_synced(&self) {
        self.set_state(SyncState::Synced {
            at: Utc::now().timestamp_millis(),
        });
    }

    // ── Reads ─────────────────────────────────────────────────

    /// The full snapshot, newest first.
    #[must_use]
    pub fn list_all(&self) -> &[Record] {
        &self.snapshot
    }

    /// Snapshot filtered by category or media kind, newest first.
    #[must_use]
    pub fn list_filtered(&self, filter: &Filter) -> Vec<Record> {
        self.snapshot
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect()
    }

    /// Record counts and byte usage for status reporting.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub fn usage(&self) -> Result<StorageUsage> {
        self.store.usage()
    }

    // ── Sync paths ────────────────────────────────────────────

    /// Initial load: reconcile the local store with the remote mirror.
    ///
    /// Pulls the remote snapshot and merges it into the local one,
    /// persisting only when the merge actually changed something. A
    /// reachable but empty remote gets seeded with the local data. An
    /// unreachable remote leaves the local snapshot untouched and the
    /// state `Offline` — never an error.
    ///
    /// # Errors
    ///
    /// Returns an error only on local store failure.
    pub async fn initial_load(&mut self) -> Result<()> {
        self.snapshot = self.store.get_all()?;

        if !self.mirror.is_configured() {
            self.set_state(SyncState::LocalOnly);
            return Ok(());
        }

        self.set_state(SyncState::Syncing);
        match self.mirror.pull().await {
            Err(e) => {
                warn!(error = %e, "initial pull failed; continuing local-only");
                self.set_state(SyncState::Offline);
            }
            Ok(None) => {
                if self.snapshot.is_empty() {
                    self.mark_synced();
                } else {
                    // Seed the empty remote with what we have.
                    self.push_best_effort().await;
                }
            }
            Ok(Some(remote)) => {
                let merged = merge(&self.snapshot, &remote);
                if !same_snapshot(&merged, &self.snapshot) {
                    self.persist_snapshot(merged)?;
                }
                self.mark_synced();
            }
        }
        Ok(())
    }

    /// Manual sync: pull, merge, persist, push.
    ///
    /// If the remote has data it is merged with local (remote wins on id
    /// collision) and the merged set is persisted via full rewrite, then
    /// pushed back. An empty remote just receives the local snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error only on local store failure; remote failure is a
    /// status update.
    pub async fn sync_now(&mut self) -> Result<SyncState> {
        if !self.mirror.is_configured() {
            self.set_state(SyncState::LocalOnly);
            return Ok(self.state());
        }

        self.set_state(SyncState::Syncing);
        match self.mirror.pull().await {
            Err(e) => {
                warn!(error = %e, "manual sync pull failed");
                self.set_state(SyncState::Offline);
            }
            Ok(None) => {
                self.push_best_effort().await;
            }
            Ok(Some(remote)) => {
                let merged = merge(&self.snapshot, &remote);
                if !same_snapshot(&merged, &self.snapshot) {
                    self.persist_snapshot(merged)?;
                }
                self.push_best_effort().await;
            }
        }
        Ok(self.state())
    }

    /// Live reconciliation: apply a remote-change notification.
    ///
    /// The remote is authoritative for this event: if the notified
    /// snapshot structurally differs from ours it replaces the local set
    /// directly (no merge — only the initial/manual paths run the two-way
    /// merge). Returns whether anything changed.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the replacement fails.
    pub fn apply_remote_snapshot(&mut self, remote: Vec<Record>) -> Result<bool> {
        if same_snapshot(&remote, &self.snapshot) {
            return Ok(false);
        }

        let mut remote = remote;
        sort_snapshot(&mut remote);
        self.persist_snapshot(remote)?;
        self.mark_synced();
        Ok(true)
    }

    /// Run the live-subscription loop until the mirror's channel closes.
    ///
    /// The subscription callback may fire at any time, including while a
    /// manual sync is in flight elsewhere; the structural equality check
    /// inside [`Self::apply_remote_snapshot`] makes that safe.
    ///
    /// # Errors
    ///
    /// Returns an error if applying a remote snapshot fails locally.
    pub async fn watch_remote(&mut self) -> Result<()> {
        if !self.mirror.is_configured() {
            return Ok(());
        }

        let mut rx = self.mirror.subscribe();
        while rx.changed().await.is_ok() {
            let notified = rx.borrow_and_update().clone();
            if let Some(remote) = notified {
                if self.apply_remote_snapshot(remote)? {
                    info!(total = self.snapshot.len(), "applied remote change");
                }
            }
        }
        Ok(())
    }

    // ── Mutations ─────────────────────────────────────────────

    /// Add a new record and propagate it to the mirror best-effort.
    ///
    /// The local write happens first and is never blocked or reverted by
    /// remote unavailability; a failed push only flips the status surface
    /// to `Offline`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateId`] or [`Error::StorageExhausted`] from
    /// the local store.
    pub async fn add(
        &mut self,
        kind: MediaKind,
        category: &str,
        data: String,
        caption: String,
        size: i64,
    ) -> Result<Record> {
        let record = Record::new(&self.ids, kind, category, data, caption, size);
        self.store.put(&record)?;

        self.snapshot.push(record.clone());
        sort_snapshot(&mut self.snapshot);

        self.push_best_effort().await;
        Ok(record)
    }

    /// Remove a record by id. A missing id is a silent no-op: nothing
    /// changes and no push is attempted. Returns whether a record was
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns an error on local store failure.
    pub async fn remove(&mut self, id: i64) -> Result<bool> {
        let removed = self.store.delete(id)?;
        if removed {
            self.snapshot.retain(|r| r.id != id);
            self.push_best_effort().await;
        }
        Ok(removed)
    }

    /// Remove every record, locally and (when sync is active) remotely in
    /// the same logical operation.
    ///
    /// # Errors
    ///
    /// Returns an error on local store failure.
    pub async fn clear(&mut self) -> Result<()> {
        self.store.clear()?;
        self.snapshot.clear();
        self.push_best_effort().await;
        Ok(())
    }

    // ── Backup ────────────────────────────────────────────────

    /// Serialize the current snapshot to a backup document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn export_all(&self) -> Result<String> {
        backup::export(&self.snapshot)
    }

    /// Import a backup document and merge it into the current set.
    ///
    /// The imported set takes the remote role in the merge, so its copies
    /// win on id collision. Structurally invalid documents abort with
    /// [`Error::InvalidFormat`] before any mutation; individually
    /// malformed records are dropped and counted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] for a malformed document, or a
    /// store error if persisting the merge fails.
    pub async fn import_merge(&mut self, bytes: &[u8]) -> Result<ImportSummary> {
        let outcome = backup::import(bytes)?;

        let before = self.snapshot.len();
        let merged = merge(&self.snapshot, &outcome.records);
        let total = merged.len();
        self.persist_snapshot(merged)?;

        self.push_best_effort().await;

        Ok(ImportSummary {
            imported: outcome.records.len(),
            dropped: outcome.dropped,
            added: total - before,
            total,
        })
    }

    // ── Internals ─────────────────────────────────────────────

    /// Swap in a new canonical snapshot: store first, then the cache.
    fn persist_snapshot(&mut self, records: Vec<Record>) -> Result<()> {
        self.store.replace_all(&records)?;
        for record in &records {
            self.ids.observe(record.id);
        }
        self.snapshot = records;
        Ok(())
    }

    /// Push the current snapshot, converting failure to `Offline` status.
    async fn push_best_effort(&mut self) {
        if !self.mirror.is_configured() {
            return;
        }

        self.set_state(SyncState::Syncing);
        match self.mirror.push(&self.snapshot).await {
            Ok(()) => self.mark_synced(),
            Err(e) => {
                warn!(error = %e, "push failed; local state kept");
                self.set_state(SyncState::Offline);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::RemoteSnapshot;
    use std::sync::{Arc, Mutex};

    /// In-memory mirror scripted per test.
    #[derive(Default)]
    struct MockState {
        remote: RemoteSnapshot,
        reachable: bool,
        pushes: Vec<Vec<Record>>,
    }

    #[derive(Clone)]
    struct MockMirror {
        state: Arc<Mutex<MockState>>,
        tx: Arc<watch::Sender<RemoteSnapshot>>,
    }

    impl MockMirror {
        fn new(remote: RemoteSnapshot, reachable: bool) -> Self {
            let (tx, _) = watch::channel(None);
            Self {
                state: Arc::new(Mutex::new(MockState {
                    remote,
                    reachable,
                    pushes: Vec::new(),
                })),
                tx: Arc::new(tx),
            }
        }

        fn pushes(&self) -> Vec<Vec<Record>> {
            self.state.lock().unwrap().pushes.clone()
        }
    }

    impl Mirror for MockMirror {
        fn is_configured(&self) -> bool {
            true
        }

        async fn pull(&self) -> Result<RemoteSnapshot> {
            let state = self.state.lock().unwrap();
            if state.reachable {
                Ok(state.remote.clone())
            } else {
                Err(Error::Unreachable("mock down".to_string()))
            }
        }

        async fn push(&self, records: &[Record]) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            if state.reachable {
                state.remote = Some(records.to_vec());
                state.pushes.push(records.to_vec());
                Ok(())
            } else {
                Err(Error::Unreachable("mock down".to_string()))
            }
        }

        fn subscribe(&self) -> watch::Receiver<RemoteSnapshot> {
            self.tx.subscribe()
        }
    }

    fn record(id: i64, ts: i64, caption: &str) -> Record {
        Record {
            id,
            kind: MediaKind::Photo,
            category: "together".to_string(),
            data: format!("data:{id}"),
            caption: caption.to_string(),
            timestamp: ts,
            size: 10,
        }
    }

    fn coordinator_with(
        local: &[Record],
        mirror: MockMirror,
    ) -> SyncCoordinator<MockMirror> {
        let mut store = RecordStore::open_memory().unwrap();
        store.replace_all(local).unwrap();
        SyncCoordinator::new(store, mirror).unwrap()
    }

    #[tokio::test]
    async fn mutation_survives_unreachable_remote() {
        let mirror = MockMirror::new(None, false);
        let mut coord = coordinator_with(&[], mirror);

        let added = coord
            .add(
                MediaKind::Photo,
                "her",
                "data:x".to_string(),
                "still here".to_string(),
                5,
            )
            .await
            .unwrap();

        // Local-first: the add landed despite the dead remote.
        let listed = coord.list_all();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, added.id);
        assert_eq!(coord.state(), SyncState::Offline);
    }

    #[tokio::test]
    async fn initial_load_seeds_empty_remote() {
        let local = vec![record(1, 100, "a")];
        let mirror = MockMirror::new(None, true);
        let mut coord = coordinator_with(&local, mirror.clone());

        coord.initial_load().await.unwrap();

        let pushes = mirror.pushes();
        assert_eq!(pushes.len(), 1);
        assert!(same_snapshot(&pushes[0], &local));
        assert!(matches!(coord.state(), SyncState::Synced { .. }));
    }

    #[tokio::test]
    async fn initial_load_merges_remote_changes() {
        let local = vec![record(1, 100, "one"), record(2, 200, "two")];
        let remote = vec![record(2, 250, "x")];
        let mirror = MockMirror::new(Some(remote), true);
        let mut coord = coordinator_with(&local, mirror);

        coord.initial_load().await.unwrap();

        let listed = coord.list_all();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, 2);
        assert_eq!(listed[0].caption, "x");
        assert_eq!(listed[1].id, 1);
    }

    #[tokio::test]
    async fn initial_load_pull_failure_goes_offline_not_stuck() {
        let local = vec![record(1, 100, "a")];
        let mirror = MockMirror::new(None, false);
        let mut coord = coordinator_with(&local, mirror);

        coord.initial_load().await.unwrap();

        assert_eq!(coord.state(), SyncState::Offline);
        assert_eq!(coord.list_all().len(), 1);
    }

    #[tokio::test]
    async fn sync_now_persists_and_pushes_the_merge() {
        let local = vec![record(1, 100, "mine")];
        let remote = vec![record(2, 200, "theirs")];
        let mirror = MockMirror::new(Some(remote), true);
        let mut coord = coordinator_with(&local, mirror.clone());

        let state = coord.sync_now().await.unwrap();

        assert!(matches!(state, SyncState::Synced { .. }));
        assert_eq!(coord.list_all().len(), 2);
        let pushes = mirror.pushes();
        assert_eq!(pushes.last().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn remove_missing_id_is_silent_and_pushes_nothing() {
        let mirror = MockMirror::new(None, true);
        let mut coord = coordinator_with(&[record(1, 100, "a")], mirror.clone());

        let removed = coord.remove(999).await.unwrap();

        assert!(!removed);
        assert_eq!(coord.list_all().len(), 1);
        assert!(mirror.pushes().is_empty());
    }

    #[tokio::test]
    async fn clear_empties_local_and_remote() {
        let mirror = MockMirror::new(Some(vec![record(1, 100, "a")]), true);
        let mut coord = coordinator_with(&[record(1, 100, "a")], mirror.clone());

        coord.clear().await.unwrap();

        assert!(coord.list_all().is_empty());
        assert_eq!(mirror.pushes().last().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn apply_remote_snapshot_is_a_direct_replace() {
        let local = vec![record(1, 100, "local-only"), record(2, 200, "both")];
        let mirror = MockMirror::new(None, true);
        let mut coord = coordinator_with(&local, mirror);

        // Remote authoritative: id 1 disappears, not merged back in.
        let changed = coord
            .apply_remote_snapshot(vec![record(2, 200, "both")])
            .unwrap();

        assert!(changed);
        let listed = coord.list_all();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, 2);
    }

    #[tokio::test]
    async fn apply_remote_snapshot_skips_equal_snapshots() {
        let local = vec![record(1, 100, "a"), record(2, 100, "b")];
        let mirror = MockMirror::new(None, true);
        let mut coord = coordinator_with(&local, mirror);
        let before = coord.state();

        // Same set, different order: structurally equal, no-op.
        let changed = coord
            .apply_remote_snapshot(vec![record(2, 100, "b"), record(1, 100, "a")])
            .unwrap();

        assert!(!changed);
        assert_eq!(coord.state(), before);
    }

    #[tokio::test]
    async fn import_merges_with_import_in_the_remote_role() {
        let local = vec![record(5, 100, "local copy")];
        let mirror = MockMirror::new(None, true);
        let mut coord = coordinator_with(&local, mirror.clone());

        let doc = serde_json::to_vec(&vec![record(5, 100, "imported copy"), record(6, 50, "new")])
            .unwrap();
        let summary = coord.import_merge(&doc).await.unwrap();

        assert_eq!(summary.imported, 2);
        assert_eq!(summary.dropped, 0);
        assert_eq!(summary.added, 1);
        assert_eq!(summary.total, 2);

        // Import wins on collision, and the merged set was pushed.
        let by_id: Vec<&Record> = coord.list_all().iter().collect();
        assert!(by_id.iter().any(|r| r.id == 5 && r.caption == "imported copy"));
        assert_eq!(mirror.pushes().last().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn invalid_import_leaves_store_untouched() {
        let local = vec![record(1, 100, "a")];
        let mirror = MockMirror::new(None, true);
        let mut coord = coordinator_with(&local, mirror.clone());

        let err = coord.import_merge(b"\"not an array\"").await.unwrap_err();

        assert!(matches!(err, Error::InvalidFormat(_)));
        assert_eq!(coord.list_all().len(), 1);
        assert!(mirror.pushes().is_empty());
    }

    #[tokio::test]
    async fn new_ids_never_collide_with_imported_ones() {
        let future_id = Utc::now().timestamp_millis() + 1_000_000;
        let local = vec![record(future_id, future_id, "from the future")];
        let mirror = MockMirror::new(None, true);
        let mut coord = coordinator_with(&local, mirror);

        let added = coord
            .add(MediaKind::Photo, "her", "d".to_string(), String::new(), 1)
            .await
            .unwrap();

        assert!(added.id > future_id);
    }

    #[tokio::test]
    async fn watch_remote_applies_and_suppresses_notifications() {
        let mirror = MockMirror::new(None, true);
        let tx = mirror.tx.clone();
        let local = vec![record(1, 100, "a")];
        let mut coord = coordinator_with(&local, mirror);
        let mut state_rx = coord.state_watch();

        let driver = tokio::spawn(async move {
            tx.send(Some(vec![record(1, 100, "a"), record(2, 200, "b")]))
                .unwrap();
            tokio::task::yield_now().await;
            assert!(
                state_rx.has_changed().unwrap(),
                "a changed snapshot must update the sync state"
            );
            state_rx.mark_unchanged();

            // Same set reordered: structurally equal, must be ignored.
            tx.send(Some(vec![record(2, 200, "b"), record(1, 100, "a")]))
                .unwrap();
            tokio::task::yield_now().await;
            assert!(
                !state_rx.has_changed().unwrap(),
                "an equal snapshot must not re-trigger a sync"
            );
        });

        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            coord.watch_remote(),
        )
        .await;
        driver.await.unwrap();

        let listed = coord.list_all();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, 2);
        assert!(matches!(coord.state(), SyncState::Synced { .. }));
    }

    #[tokio::test]
    async fn list_filtered_by_kind_and_category() {
        let mirror = MockMirror::new(None, true);
        let mut local = vec![record(1, 100, "a"), record(2, 200, "b")];
        local[1].category = "her".to_string();
        let video = Record {
            id: 3,
            kind: MediaKind::Video,
            category: crate::model::VIDEO_CATEGORY.to_string(),
            data: "https://x/v.mp4".to_string(),
            caption: String::new(),
            timestamp: 300,
            size: 0,
        };
        local.push(video);
        let coord = coordinator_with(&local, mirror);

        assert_eq!(coord.list_filtered(&Filter::All).len(), 3);
        assert_eq!(coord.list_filtered(&Filter::Videos).len(), 1);
        let hers = coord.list_filtered(&Filter::Category("her".to_string()));
        assert_eq!(hers.len(), 1);
        assert_eq!(hers[0].id, 2);
    }
}
