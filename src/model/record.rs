//! The `Record` type: one stored photo or video memory.
//!
//! Records are immutable once created; the only whole-record mutation is
//! replacement during a merge. The `id` is the sole identity and the merge
//! key. Timestamps order the collection but are **not** unique — two devices
//! can create records in the same millisecond, so identity never derives
//! from the timestamp alone.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Category sentinel forced onto every video record.
pub const VIDEO_CATEGORY: &str = "video";

/// Maximum accepted payload size (10 MB), checked before a record is built.
pub const MAX_PAYLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Kind of media a record holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Photo => write!(f, "photo"),
            Self::Video => write!(f, "video"),
        }
    }
}

impl std::str::FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "photo" => Ok(Self::Photo),
            "video" => Ok(Self::Video),
            _ => Err(format!("Unknown media kind: {s}")),
        }
    }
}

/// One stored photo/video entry with metadata.
///
/// The `data` payload is opaque to the store: either an embedded encoded
/// blob (data URL) or an external reference URL. It is never re-encoded
/// or interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique identity and merge key. Time-derived at creation, never
    /// reassigned or recycled.
    pub id: i64,
    /// Media kind, serialized as the `type` field of the backup format.
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// Free-form tag for photos; always [`VIDEO_CATEGORY`] for videos.
    pub category: String,
    /// Opaque payload: embedded encoded blob or reference URL.
    pub data: String,
    /// Human caption. May be empty; defaults are the caller's job.
    pub caption: String,
    /// Creation time in Unix milliseconds. Ordering only, not identity.
    pub timestamp: i64,
    /// Advisory payload byte count, used for storage-usage reporting.
    pub size: i64,
}

impl Record {
    /// Build a record for a newly added memory.
    ///
    /// The id comes from the allocator (unique even within one millisecond);
    /// the timestamp is the current wall clock. Videos get the category
    /// sentinel regardless of what the caller passed.
    #[must_use]
    pub fn new(
        ids: &IdAllocator,
        kind: MediaKind,
        category: &str,
        data: String,
        caption: String,
        size: i64,
    ) -> Self {
        let category = match kind {
            MediaKind::Video => VIDEO_CATEGORY.to_string(),
            MediaKind::Photo => category.to_string(),
        };
        Self {
            id: ids.next(),
            kind,
            category,
            data,
            caption,
            timestamp: Utc::now().timestamp_millis(),
            size,
        }
    }
}

/// Monotonic id source.
///
/// Ids are wall-clock milliseconds, bumped past the previously issued id
/// when the clock has not advanced. Two back-to-back calls within the same
/// millisecond therefore still produce distinct ids.
#[derive(Debug)]
pub struct IdAllocator {
    last: AtomicI64,
}

impl IdAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            last: AtomicI64::new(0),
        }
    }

    /// Seed the allocator so future ids stay above everything already stored.
    pub fn observe(&self, id: i64) {
        self.last.fetch_max(id, Ordering::SeqCst);
    }

    /// Issue the next unique id.
    pub fn next(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let prev = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or(now);
        now.max(prev + 1)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
