//! Deterministic record-set reconciliation.
//!
//! The merge is a pure function over two snapshots. On id collision the
//! remote copy replaces the local one unconditionally (**remote-wins**,
//! last-loaded rather than last-timestamp). This is a policy choice kept
//! for compatibility with existing stored data: an adversely ordered remote
//! write can clobber a newer local edit, and the canonical result sorts by
//! timestamp descending regardless of which side a record came from.
//!
//! The same function serves three callers: the initial multi-device load,
//! manual sync, and backup import (where the imported set takes the remote
//! role).

use std::collections::HashMap;

use crate::model::Record;

/// Merge two snapshots into one canonical snapshot.
///
/// Ids present only on one side are preserved; on collision the entry from
/// `remote` wins whole-record (no field-level reconciliation). The result
/// is sorted descending by timestamp; ties keep no particular order.
#[must_use]
pub fn merge(local: &[Record], remote: &[Record]) -> Vec<Record> {
    let mut by_id: HashMap<i64, &Record> = HashMap::with_capacity(local.len() + remote.len());
    for record in local {
        by_id.insert(record.id, record);
    }
    for record in remote {
        by_id.insert(record.id, record);
    }

    let mut merged: Vec<Record> = by_id.into_values().cloned().collect();
    sort_snapshot(&mut merged);
    merged
}

/// Sort a snapshot into canonical order: newest first.
pub fn sort_snapshot(records: &mut [Record]) {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// Structural snapshot equality, compared in id order.
///
/// Used by the sync coordinator to decide whether a remote notification or
/// a merge result actually changed anything, avoiding redundant writes and
/// merge storms. Reference identity and incidental ordering of timestamp
/// ties are irrelevant.
#[must_use]
pub fn same_snapshot(a: &[Record], b: &[Record]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a_sorted: Vec<&Record> = a.iter().collect();
    let mut b_sorted: Vec<&Record> = b.iter().collect();
    a_sorted.sort_by_key(|r| r.id);
    b_sorted.sort_by_key(|r| r.id);
    a_sorted == b_sorted
}
