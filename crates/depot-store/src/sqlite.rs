//! SQLite implementation of the RecordStore trait.
//!
//! This is the durable record backend. It uses rusqlite with bundled SQLite.
//! The connection sits behind a mutex; appends run in an immediate
//! transaction so timestamp assignment and insert are one atomic step.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{params, Connection, TransactionBehavior};
use tracing::{debug, info};

use depot_core::{
    decode_value, next_timestamp, Clock, Digest, Key, Record, SystemClock, Timestamp,
};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{Backlog, RecordStore};

/// SQLite-based record store.
#[derive(Debug)]
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
    clock: Arc<dyn Clock>,
}

impl SqliteRecordStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_clock(path, Arc::new(SystemClock))
    }

    pub fn open_with_clock(path: impl AsRef<Path>, clock: Arc<dyn Clock>) -> Result<Self> {
        let path = path.as_ref();
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        info!(path = %path.display(), "opened record database");
        Ok(Self {
            conn: Mutex::new(conn),
            clock,
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        Self::open_memory_with_clock(Arc::new(SystemClock))
    }

    pub fn open_memory_with_clock(clock: Arc<dyn Clock>) -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            clock,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    /// Rows of `key`, newest first.
    fn query_history(conn: &Connection, key: &str, limit: Option<u32>) -> Result<Vec<Record>> {
        let mut stmt = conn.prepare_cached(
            "SELECT key, timestamp, seq, value, attachment
             FROM records WHERE key = ?1
             ORDER BY timestamp DESC, seq DESC
             LIMIT ?2",
        )?;

        // SQLite treats a negative LIMIT as unbounded.
        let limit = limit.map(i64::from).unwrap_or(-1);
        let rows = stmt
            .query_map(params![key, limit], RawRecord::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter().map(RawRecord::into_record).collect()
    }
}

/// A row as stored, before decoding.
struct RawRecord {
    key: String,
    timestamp: i64,
    seq: i64,
    value: Vec<u8>,
    attachment: Option<String>,
}

impl RawRecord {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            key: row.get("key")?,
            timestamp: row.get("timestamp")?,
            seq: row.get("seq")?,
            value: row.get("value")?,
            attachment: row.get("attachment")?,
        })
    }

    fn into_record(self) -> Result<Record> {
        let key = Key::new(self.key)
            .map_err(|e| StoreError::InvalidData(format!("stored key: {}", e)))?;
        let attachment = self
            .attachment
            .map(|hex| Digest::from_hex(&hex))
            .transpose()
            .map_err(|e| StoreError::InvalidData(format!("stored attachment: {}", e)))?;

        Ok(Record {
            key,
            timestamp: Timestamp::from_millis(self.timestamp),
            seq: self.seq as u64,
            value: decode_value(&self.value)?,
            attachment,
        })
    }
}

impl RecordStore for SqliteRecordStore {
    fn append(
        &self,
        key: &Key,
        encoded: Vec<u8>,
        attachment: Option<Digest>,
    ) -> Result<Timestamp> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let latest: Option<i64> = tx.query_row(
            "SELECT MAX(timestamp) FROM records WHERE key = ?1",
            params![key.as_str()],
            |row| row.get(0),
        )?;
        let timestamp = next_timestamp(self.clock.now(), latest.map(Timestamp::from_millis));

        tx.execute(
            "INSERT INTO records (key, timestamp, value, attachment) VALUES (?1, ?2, ?3, ?4)",
            params![
                key.as_str(),
                timestamp.as_millis(),
                encoded,
                attachment.map(|d| d.to_hex()),
            ],
        )?;
        let seq = tx.last_insert_rowid();
        tx.commit()?;

        debug!(key = %key, %timestamp, seq, "appended record");
        Ok(timestamp)
    }

    fn read_latest(&self, key: &str) -> Result<Record> {
        let conn = self.lock()?;
        Self::query_history(&conn, key, Some(1))?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn backlog(&self, key: &str) -> Result<Backlog> {
        let records = {
            let conn = self.lock()?;
            Self::query_history(&conn, key, None)?
        };

        if records.is_empty() {
            return Err(StoreError::NotFound(key.to_string()));
        }
        Ok(Backlog::new(records))
    }

    fn count(&self, key: &str) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM records WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn keys(&self) -> Result<Vec<Key>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT DISTINCT key FROM records ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        keys.into_iter()
            .map(|k| Key::new(k).map_err(|e| StoreError::InvalidData(e.to_string())))
            .collect()
    }
}
