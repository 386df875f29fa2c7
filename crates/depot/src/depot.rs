//! The storage facade: the read/write/backlog contract over any backend.
//!
//! [`Depot`] enforces the write protocol the same way for every backend:
//! validate first, persist the attachment, then append the record that
//! references it. A failure at any step leaves no record behind; at worst an
//! unreferenced blob.

use std::fs;
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, info};

use depot_core::{
    validate_attachment, validate_key, validate_value, Clock, Digest, Key, Limits, Record,
    SystemClock, Timestamp, Value,
};
use depot_store::{
    Backlog, BlobStore, FsBlobStore, MemoryBlobStore, MemoryRecordStore, RecordStore,
    SqliteRecordStore,
};

use crate::config::DepotConfig;
use crate::error::Result;

/// One version of a key as seen by callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub timestamp: Timestamp,
    pub value: Value,
    pub attachment: Option<Digest>,
}

impl From<Record> for Entry {
    fn from(record: Record) -> Self {
        Self {
            timestamp: record.timestamp,
            value: record.value,
            attachment: record.attachment,
        }
    }
}

/// Newest-first history of a key. Finite; each `backlog` call builds a new one.
#[derive(Debug, Clone)]
pub struct History {
    inner: Backlog,
}

impl Iterator for History {
    type Item = Entry;

    fn next(&mut self) -> Option<Entry> {
        self.inner.next().map(Entry::from)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for History {}

/// The storage contract shared by all backends.
///
/// Every implementation must produce the same observable behaviour: the same
/// error kinds for the same inputs and the same history ordering. Callers
/// (the HTTP layer, tests) treat implementations interchangeably, usually as
/// `Arc<dyn Storage>`.
pub trait Storage: Send + Sync {
    /// Value of the newest version of `key`.
    fn read(&self, key: &str) -> Result<Value>;

    /// Append a new version of `key`, storing `attachment` first if given.
    fn write(&self, key: &str, value: &Value, attachment: Option<&[u8]>) -> Result<Timestamp>;

    /// Every version of `key`, newest first.
    fn backlog(&self, key: &str) -> Result<History>;

    /// Newest version of `key` including its timestamp and attachment.
    fn latest(&self, key: &str) -> Result<Entry>;

    /// Raw bytes of an attachment.
    fn attachment(&self, digest: &Digest) -> Result<Bytes>;

    /// Every key with at least one version, sorted.
    fn keys(&self) -> Result<Vec<Key>>;

    /// Number of versions of `key`; 0 when it was never written.
    fn count(&self, key: &str) -> Result<usize>;
}

/// A storage facade over a record store and a blob store.
#[derive(Debug)]
pub struct Depot<R, B> {
    records: R,
    blobs: B,
    limits: Limits,
}

/// Fully in-memory Depot.
pub type MemoryDepot = Depot<MemoryRecordStore, MemoryBlobStore>;

/// SQLite records with a sharded blob directory.
pub type SqliteDepot = Depot<SqliteRecordStore, FsBlobStore>;

impl<R: RecordStore, B: BlobStore> Depot<R, B> {
    pub fn new(records: R, blobs: B) -> Self {
        Self {
            records,
            blobs,
            limits: Limits::default(),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn records(&self) -> &R {
        &self.records
    }

    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }
}

impl Depot<MemoryRecordStore, MemoryBlobStore> {
    pub fn memory() -> Self {
        Self::memory_with_clock(Arc::new(SystemClock))
    }

    pub fn memory_with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::new(MemoryRecordStore::with_clock(clock), MemoryBlobStore::new())
    }
}

impl Depot<SqliteRecordStore, FsBlobStore> {
    /// Open (creating if needed) a durable Depot under `config.data_dir`.
    pub fn open(config: &DepotConfig) -> Result<Self> {
        Self::open_with_clock(config, Arc::new(SystemClock))
    }

    pub fn open_with_clock(config: &DepotConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        fs::create_dir_all(&config.data_dir).map_err(depot_store::StoreError::from)?;

        let records = SqliteRecordStore::open_with_clock(config.database_path(), clock)?;
        let blobs = FsBlobStore::open(config.blobs_path())?;
        info!(data_dir = %config.data_dir.display(), "depot opened");

        Ok(Self::new(records, blobs).with_limits(config.limits))
    }
}

impl<R: RecordStore, B: BlobStore> Storage for Depot<R, B> {
    fn read(&self, key: &str) -> Result<Value> {
        Ok(self.records.read_latest(key)?.value)
    }

    fn write(&self, key: &str, value: &Value, attachment: Option<&[u8]>) -> Result<Timestamp> {
        // Validate everything before touching either store.
        let key = validate_key(key, &self.limits)?;
        let encoded = validate_value(value, &self.limits)?;
        if let Some(bytes) = attachment {
            validate_attachment(bytes, &self.limits)?;
        }

        // The blob must exist before any record can reference it.
        let digest = attachment.map(|bytes| self.blobs.put(bytes)).transpose()?;
        let timestamp = self.records.append(&key, encoded, digest)?;

        debug!(key = %key, %timestamp, attachment = ?digest, "write accepted");
        Ok(timestamp)
    }

    fn backlog(&self, key: &str) -> Result<History> {
        Ok(History {
            inner: self.records.backlog(key)?,
        })
    }

    fn latest(&self, key: &str) -> Result<Entry> {
        Ok(self.records.read_latest(key)?.into())
    }

    fn attachment(&self, digest: &Digest) -> Result<Bytes> {
        Ok(self.blobs.get(digest)?)
    }

    fn keys(&self) -> Result<Vec<Key>> {
        Ok(self.records.keys()?)
    }

    fn count(&self, key: &str) -> Result<usize> {
        Ok(self.records.count(key)?)
    }
}
