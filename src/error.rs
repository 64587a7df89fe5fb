//! Error types for Memkeep.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=storage, 4=validation, 6=remote, etc.)
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Memkeep operations.
pub type Result<T> = std::result::Result<T, Error>;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
///
/// Each code maps to a SCREAMING_SNAKE string and a category-based
/// exit code. Scripts match on the string or on the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Storage (exit 2)
    NotInitialized,
    AlreadyInitialized,
    DatabaseError,
    StorageExhausted,

    // Validation (exit 4)
    DuplicateId,
    InvalidFormat,
    PayloadTooLarge,
    InvalidArgument,

    // Remote (exit 6)
    Unreachable,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::StorageExhausted => "STORAGE_EXHAUSTED",
            Self::DuplicateId => "DUPLICATE_ID",
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::Unreachable => "UNREACHABLE",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::NotInitialized
            | Self::AlreadyInitialized
            | Self::DatabaseError
            | Self::StorageExhausted => 2,
            Self::DuplicateId
            | Self::InvalidFormat
            | Self::PayloadTooLarge
            | Self::InvalidArgument => 4,
            Self::Unreachable => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether the caller should retry after correcting input or waiting.
    ///
    /// True for validation errors and remote unavailability. False for
    /// storage exhaustion, I/O, or internal errors.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidFormat
                | Self::PayloadTooLarge
                | Self::InvalidArgument
                | Self::Unreachable
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in Memkeep operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not initialized: run `mk init` first")]
    NotInitialized,

    #[error("Already initialized at {path}")]
    AlreadyInitialized { path: PathBuf },

    #[error("Record with id {id} already exists")]
    DuplicateId { id: i64 },

    #[error("Local storage is full: {0}")]
    StorageExhausted(String),

    #[error("Remote mirror unreachable: {0}")]
    Unreachable(String),

    #[error("Invalid backup format: {0}")]
    InvalidFormat(String),

    #[error("Payload too large: {size} bytes (limit {limit})")]
    PayloadTooLarge { size: u64, limit: u64 },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::NotInitialized => ErrorCode::NotInitialized,
            Self::AlreadyInitialized { .. } => ErrorCode::AlreadyInitialized,
            Self::DuplicateId { .. } => ErrorCode::DuplicateId,
            Self::StorageExhausted(_) => ErrorCode::StorageExhausted,
            Self::Unreachable(_) => ErrorCode::Unreachable,
            Self::InvalidFormat(_) => ErrorCode::InvalidFormat,
            Self::PayloadTooLarge { .. } => ErrorCode::PayloadTooLarge,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint for humans and scripts.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::NotInitialized => Some("Run `mk init` to create the local store".to_string()),

            Self::AlreadyInitialized { path } => Some(format!(
                "Store already exists at {}. Use `--force` to reinitialize.",
                path.display()
            )),

            Self::DuplicateId { id } => Some(format!(
                "A record with id {id} is already stored. Use `mk list` to inspect it."
            )),

            Self::StorageExhausted(_) => Some(
                "The local store is out of space. Remove records with `mk rm` \
                 or export a backup and `mk clear`."
                    .to_string(),
            ),

            Self::Unreachable(_) => Some(
                "Local changes are saved. They will be pushed on the next \
                 mutation or `mk sync`."
                    .to_string(),
            ),

            Self::InvalidFormat(_) => Some(
                "Backup files must contain a JSON array of records, as written \
                 by `mk export`."
                    .to_string(),
            ),

            Self::PayloadTooLarge { limit, .. } => {
                Some(format!("Media files are limited to {limit} bytes."))
            }

            Self::Database(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::InvalidArgument(_)
            | Self::Config(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    ///
    /// Includes error code, message, retryability, exit code, and
    /// optional recovery hint.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_by_category() {
        assert_eq!(Error::NotInitialized.exit_code(), 2);
        assert_eq!(Error::DuplicateId { id: 1 }.exit_code(), 4);
        assert_eq!(Error::InvalidFormat("x".into()).exit_code(), 4);
        assert_eq!(Error::Unreachable("down".into()).exit_code(), 6);
        assert_eq!(Error::Config("bad".into()).exit_code(), 7);
    }

    #[test]
    fn unreachable_is_retryable() {
        assert!(Error::Unreachable("down".into()).error_code().is_retryable());
        assert!(
            !Error::StorageExhausted("full".into())
                .error_code()
                .is_retryable()
        );
    }

    #[test]
    fn structured_json_includes_hint() {
        let err = Error::NotInitialized;
        let json = err.to_structured_json();
        assert_eq!(json["error"]["code"], "NOT_INITIALIZED");
        assert!(json["error"]["hint"].as_str().unwrap().contains("mk init"));
    }
}
