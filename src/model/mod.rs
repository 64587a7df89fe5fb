//! Data types for the record store.

mod record;

pub use record::{IdAllocator, MediaKind, Record, MAX_PAYLOAD_BYTES, VIDEO_CATEGORY};
