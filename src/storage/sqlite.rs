//! SQLite record store implementation.
//!
//! All mutations run inside transactions so concurrent readers observe
//! either the pre- or post-operation state, never a partial one. The
//! whole-set swap used by merge persistence (`replace_all`) is a single
//! transaction for the same reason.

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, Transaction, params};

use crate::error::{Error, Result};
use crate::model::{MediaKind, Record};
use crate::storage::schema::apply_schema;

/// SQLite-backed record store.
#[derive(Debug)]
pub struct RecordStore {
    conn: Connection,
}

/// Summary of what the store currently holds.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct StorageUsage {
    /// Number of photo records.
    pub photos: usize,
    /// Number of video records.
    pub videos: usize,
    /// Sum of advisory payload sizes in bytes.
    pub bytes: i64,
}

impl StorageUsage {
    /// Total record count.
    #[must_use]
    pub fn total(&self) -> usize {
        self.photos + self.videos
    }
}

/// Map a SQLite failure to the crate error taxonomy.
///
/// `SQLITE_FULL` becomes [`Error::StorageExhausted`] so callers can surface
/// a quota problem instead of a generic database error.
fn map_db_err(err: rusqlite::Error) -> Error {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::DiskFull => {
            Error::StorageExhausted(err.to_string())
        }
        _ => Error::Database(err),
    }
}

impl RecordStore {
    /// Open a store at the given path.
    ///
    /// Creates the database and applies the schema if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or the
    /// schema fails to apply.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory store (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Read the full snapshot, sorted descending by timestamp (newest
    /// first). Ties are unordered.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_all(&self) -> Result<Vec<Record>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, kind, category, data, caption, timestamp, size
             FROM records ORDER BY timestamp DESC",
        )?;

        let rows = stmt.query_map([], row_to_record)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Insert a new record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateId`] if a record with the same id already
    /// exists, or [`Error::StorageExhausted`] when the database is full.
    pub fn put(&mut self, record: &Record) -> Result<()> {
        let tx = self.conn.transaction().map_err(map_db_err)?;

        let exists: bool = tx
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM records WHERE id = ?1)",
                [record.id],
                |r| r.get(0),
            )
            .map_err(map_db_err)?;
        if exists {
            return Err(Error::DuplicateId { id: record.id });
        }

        insert_record(&tx, record)?;
        tx.commit().map_err(map_db_err)?;
        Ok(())
    }

    /// Delete a record by id. A missing id is a no-op, not an error.
    ///
    /// Returns whether a record was actually removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete statement fails.
    pub fn delete(&mut self, id: i64) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM records WHERE id = ?1", [id])
            .map_err(map_db_err)?;
        Ok(affected > 0)
    }

    /// Remove every record.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn clear(&mut self) -> Result<()> {
        self.conn
            .execute("DELETE FROM records", [])
            .map_err(map_db_err)?;
        Ok(())
    }

    /// Atomically swap the entire record set.
    ///
    /// Used by merge persistence: the store has no field-level update, so
    /// the merged snapshot lands as clear-then-rewrite inside one
    /// transaction. Readers never observe the intermediate empty state.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails; the store is left unchanged.
    pub fn replace_all(&mut self, records: &[Record]) -> Result<()> {
        let tx = self.conn.transaction().map_err(map_db_err)?;
        tx.execute("DELETE FROM records", []).map_err(map_db_err)?;
        for record in records {
            insert_record(&tx, record)?;
        }
        tx.commit().map_err(map_db_err)?;
        Ok(())
    }

    /// Report record counts and total advisory byte usage.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn usage(&self) -> Result<StorageUsage> {
        self.conn
            .query_row(
                "SELECT
                     COUNT(*) FILTER (WHERE kind = 'photo'),
                     COUNT(*) FILTER (WHERE kind = 'video'),
                     COALESCE(SUM(size), 0)
                 FROM records",
                [],
                |r| {
                    Ok(StorageUsage {
                        photos: usize::try_from(r.get::<_, i64>(0)?).unwrap_or_default(),
                        videos: usize::try_from(r.get::<_, i64>(1)?).unwrap_or_default(),
                        bytes: r.get(2)?,
                    })
                },
            )
            .map_err(map_db_err)
    }
}

fn insert_record(tx: &Transaction<'_>, record: &Record) -> Result<()> {
    tx.execute(
        "INSERT INTO records (id, kind, category, data, caption, timestamp, size)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            record.id,
            record.kind.to_string(),
            record.category,
            record.data,
            record.caption,
            record.timestamp,
            record.size,
        ],
    )
    .map_err(map_db_err)?;
    Ok(())
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<Record> {
    let kind: String = row.get(1)?;
    let kind = kind.parse::<MediaKind>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Text,
            e.into(),
        )
    })?;
    Ok(Record {
        id: row.get(0)?,
        kind,
        category: row.get(2)?,
        data: row.get(3)?,
        caption: row.get(4)?,
        timestamp: row.get(5)?,
        size: row.get(6)?,
    })
}
