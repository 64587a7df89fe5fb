//! Record-set serialization for backup documents.

use chrono::{DateTime, Local};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::{MediaKind, Record, VIDEO_CATEGORY};

/// File-name prefix for exported backups.
pub const BACKUP_PREFIX: &str = "memkeep";

/// Serialize the full record set to a backup document.
///
/// Full structural serialization: every field of every record, pretty
/// printed so the backup stays diffable and hand-inspectable.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn export(records: &[Record]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Backup file name: `<prefix>-backup-<ISO date>-<time with ':' → '-'>.json`.
#[must_use]
pub fn backup_file_name(prefix: &str, now: DateTime<Local>) -> String {
    let date = now.format("%Y-%m-%d");
    let time = now.format("%H-%M-%S");
    format!("{prefix}-backup-{date}-{time}.json")
}

/// Result of decoding a backup document.
#[derive(Debug)]
pub struct ImportOutcome {
    /// Records recovered from the document, defaults backfilled.
    pub records: Vec<Record>,
    /// Number of entries dropped for missing `id` or `data`.
    pub dropped: usize,
}

/// Loosely-typed record as found in a backup document.
///
/// Older exports may lack `timestamp` or `size`; those are backfilled.
/// Entries without `id` or `data` cannot be recovered and are dropped.
#[derive(Debug, Deserialize)]
struct RawRecord {
    id: Option<i64>,
    #[serde(rename = "type")]
    kind: Option<MediaKind>,
    category: Option<String>,
    data: Option<String>,
    caption: Option<String>,
    timestamp: Option<i64>,
    size: Option<i64>,
}

/// Decode a backup document into records.
///
/// The top level must be a non-empty JSON array or the whole import is
/// rejected with [`Error::InvalidFormat`] — before anything touches the
/// store. Per-record recovery rules:
/// - missing `id` or `data`: dropped, counted in the outcome
/// - missing `timestamp`: backfilled from the id (which is time-derived)
/// - missing `size`: estimated from the payload length (base64 ratio)
/// - missing `caption` or `category`: empty string, except videos which
///   get the category sentinel
///
/// # Errors
///
/// Returns [`Error::InvalidFormat`] if the document is not a JSON array
/// of objects.
pub fn import(bytes: &[u8]) -> Result<ImportOutcome> {
    let doc: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| Error::InvalidFormat(format!("not valid JSON: {e}")))?;

    let entries = doc
        .as_array()
        .ok_or_else(|| Error::InvalidFormat("top level is not an array of records".to_string()))?;

    if entries.is_empty() {
        return Err(Error::InvalidFormat("backup document is empty".to_string()));
    }

    let mut records = Vec::with_capacity(entries.len());
    let mut dropped = 0usize;

    for entry in entries {
        let Ok(raw) = serde_json::from_value::<RawRecord>(entry.clone()) else {
            dropped += 1;
            continue;
        };

        let (Some(id), Some(data)) = (raw.id, raw.data) else {
            dropped += 1;
            continue;
        };

        let kind = raw.kind.unwrap_or(MediaKind::Photo);
        let category = match kind {
            MediaKind::Video => VIDEO_CATEGORY.to_string(),
            MediaKind::Photo => raw.category.unwrap_or_default(),
        };
        // The id is creation-time milliseconds, so it stands in for a
        // missing timestamp. Size falls back to a base64 payload estimate.
        let timestamp = raw.timestamp.unwrap_or(id);
        #[allow(clippy::cast_possible_wrap)]
        let size = raw.size.unwrap_or((data.len() * 3 / 4) as i64);

        records.push(Record {
            id,
            kind,
            category,
            data,
            caption: raw.caption.unwrap_or_default(),
            timestamp,
            size,
        });
    }

    Ok(ImportOutcome { records, dropped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(id: i64, ts: i64) -> Record {
        Record {
            id,
            kind: MediaKind::Photo,
            category: "together".to_string(),
            data: format!("data:image/jpeg;base64,{id:08}"),
            caption: format!("memory {id}"),
            timestamp: ts,
            size: 42,
        }
    }

    #[test]
    fn export_import_round_trips() {
        let records = vec![record(1, 100), record(2, 200)];

        let doc = export(&records).unwrap();
        let outcome = import(doc.as_bytes()).unwrap();

        assert_eq!(outcome.dropped, 0);
        assert_eq!(outcome.records, records);
    }

    #[test]
    fn non_array_document_is_rejected() {
        let err = import(br#""not an array""#).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));

        let err = import(br#"{"id": 1}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));

        let err = import(b"garbage{{{").unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn empty_array_is_rejected() {
        let err = import(b"[]").unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn records_missing_id_or_data_are_dropped() {
        let doc = r#"[
            {"id": 1, "type": "photo", "data": "d1"},
            {"type": "photo", "data": "no id"},
            {"id": 3, "type": "photo"},
            {"id": 4, "type": "photo", "data": "d4"}
        ]"#;

        let outcome = import(doc.as_bytes()).unwrap();
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.dropped, 2);
        let ids: Vec<i64> = outcome.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn missing_timestamp_and_size_are_backfilled() {
        let doc = r#"[{"id": 1700000000000, "data": "AAAABBBB"}]"#;

        let outcome = import(doc.as_bytes()).unwrap();
        let rec = &outcome.records[0];
        assert_eq!(rec.timestamp, 1_700_000_000_000);
        assert_eq!(rec.size, 6); // 8 payload chars * 3/4
        assert_eq!(rec.kind, MediaKind::Photo);
        assert_eq!(rec.caption, "");
    }

    #[test]
    fn imported_videos_get_the_category_sentinel() {
        let doc = r#"[{"id": 5, "type": "video", "data": "https://x/v.mp4", "category": "beach"}]"#;

        let outcome = import(doc.as_bytes()).unwrap();
        assert_eq!(outcome.records[0].category, VIDEO_CATEGORY);
    }

    #[test]
    fn backup_file_name_replaces_colons() {
        let when = Local.with_ymd_and_hms(2026, 8, 25, 14, 30, 5).unwrap();
        let name = backup_file_name(BACKUP_PREFIX, when);
        assert_eq!(name, "memkeep-backup-2026-08-25-14-30-05.json");
        assert!(!name.contains(':'));
    }
}
