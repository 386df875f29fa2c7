//! In-memory implementations of the store traits.
//!
//! Same semantics as the durable backends, no persistence. Values are kept
//! in their encoded form so that what comes back out is exactly what the
//! SQLite backend would return.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bytes::Bytes;
use tracing::debug;

use depot_core::{
    decode_value, next_timestamp, Clock, Digest, Key, Record, SystemClock, Timestamp,
};

use crate::error::{Result, StoreError};
use crate::traits::{Backlog, BlobStore, RecordStore};

/// In-memory record store.
///
/// All data is lost when the store is dropped. Thread-safe via one
/// store-wide RwLock.
#[derive(Debug)]
pub struct MemoryRecordStore {
    inner: RwLock<MemoryRecordsInner>,
    clock: Arc<dyn Clock>,
}

#[derive(Debug, Default)]
struct MemoryRecordsInner {
    /// Histories, oldest first.
    histories: HashMap<Key, Vec<StoredRecord>>,

    /// Insertion counter shared by all keys.
    next_seq: u64,
}

#[derive(Debug, Clone)]
struct StoredRecord {
    timestamp: Timestamp,
    seq: u64,
    value: Vec<u8>,
    attachment: Option<Digest>,
}

impl StoredRecord {
    fn to_record(&self, key: &Key) -> Result<Record> {
        Ok(Record {
            key: key.clone(),
            timestamp: self.timestamp,
            seq: self.seq,
            value: decode_value(&self.value)?,
            attachment: self.attachment,
        })
    }
}

impl MemoryRecordStore {
    /// Create a new empty store using the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a new empty store using the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: RwLock::new(MemoryRecordsInner {
                histories: HashMap::new(),
                next_seq: 1,
            }),
            clock,
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryRecordsInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn write_lock(&self) -> Result<RwLockWriteGuard<'_, MemoryRecordsInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for MemoryRecordStore {
    fn append(
        &self,
        key: &Key,
        encoded: Vec<u8>,
        attachment: Option<Digest>,
    ) -> Result<Timestamp> {
        let mut inner = self.write_lock()?;
        let seq = inner.next_seq;
        inner.next_seq += 1;

        let history = inner.histories.entry(key.clone()).or_default();
        let latest = history.last().map(|r| r.timestamp);
        let timestamp = next_timestamp(self.clock.now(), latest);

        history.push(StoredRecord {
            timestamp,
            seq,
            value: encoded,
            attachment,
        });

        debug!(key = %key, %timestamp, seq, "appended record");
        Ok(timestamp)
    }

    fn read_latest(&self, key: &str) -> Result<Record> {
        let inner = self.read()?;
        let (key, history) = inner
            .histories
            .get_key_value(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;

        let latest = history
            .last()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        latest.to_record(key)
    }

    fn backlog(&self, key: &str) -> Result<Backlog> {
        let inner = self.read()?;
        let (key, history) = inner
            .histories
            .get_key_value(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;

        if history.is_empty() {
            return Err(StoreError::NotFound(key.to_string()));
        }

        let records = history
            .iter()
            .rev()
            .map(|r| r.to_record(key))
            .collect::<Result<Vec<_>>>()?;
        Ok(Backlog::new(records))
    }

    fn count(&self, key: &str) -> Result<usize> {
        let inner = self.read()?;
        Ok(inner.histories.get(key).map(Vec::len).unwrap_or(0))
    }

    fn keys(&self) -> Result<Vec<Key>> {
        let inner = self.read()?;
        let mut keys: Vec<Key> = inner.histories.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

/// In-memory blob store.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<Digest, Bytes>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn put(&self, bytes: &[u8]) -> Result<Digest> {
        let digest = Digest::of(bytes);
        let mut blobs = self
            .blobs
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;

        // Content addressing guarantees the same digest means the same bytes.
        if blobs.contains_key(&digest) {
            debug!(%digest, "blob already present");
        } else {
            blobs.insert(digest, Bytes::copy_from_slice(bytes));
            debug!(%digest, len = bytes.len(), "stored blob");
        }
        Ok(digest)
    }

    fn get(&self, digest: &Digest) -> Result<Bytes> {
        let blobs = self
            .blobs
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        blobs
            .get(digest)
            .cloned()
            .ok_or(StoreError::BlobNotFound(*digest))
    }

    fn contains(&self, digest: &Digest) -> Result<bool> {
        let blobs = self
            .blobs
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        Ok(blobs.contains_key(digest))
    }

    fn len(&self) -> Result<usize> {
        let blobs = self
            .blobs
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        Ok(blobs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_core::{ManualClock, Value};
    use serde_json::json;

    fn key(s: &str) -> Key {
        Key::new(s).unwrap()
    }

    #[test]
    fn test_memory_store_basic() {
        let store = MemoryRecordStore::new();
        store.write(&key("x"), &json!(1), None).unwrap();

        let record = store.read_latest("x").unwrap();
        assert_eq!(record.value, json!(1));
        assert_eq!(record.key.as_str(), "x");
        assert_eq!(record.attachment, None);
    }

    #[test]
    fn test_memory_store_missing_key() {
        let store = MemoryRecordStore::new();
        assert!(matches!(store.read_latest("x"), Err(StoreError::NotFound(k)) if k == "x"));
        assert!(matches!(store.backlog("x"), Err(StoreError::NotFound(_))));
        assert!(matches!(store.backlog(""), Err(StoreError::NotFound(_))));
        assert_eq!(store.count("x").unwrap(), 0);
    }

    #[test]
    fn test_memory_store_backlog_newest_first() {
        let store = MemoryRecordStore::new();
        store.write(&key("x"), &json!(1), None).unwrap();
        store.write(&key("x"), &json!(2), None).unwrap();

        let values: Vec<Value> = store.backlog("x").unwrap().map(|r| r.value).collect();
        assert_eq!(values, vec![json!(2), json!(1)]);
        assert_eq!(store.count("x").unwrap(), 2);
    }

    #[test]
    fn test_memory_store_equal_timestamps_use_insertion_order() {
        let clock = Arc::new(ManualClock::new(1_000));
        let store = MemoryRecordStore::with_clock(clock);

        for i in 0..3 {
            store.write(&key("k"), &json!(i), None).unwrap();
        }

        let backlog: Vec<Record> = store.backlog("k").unwrap().collect();
        assert!(backlog.iter().all(|r| r.timestamp == Timestamp::from_millis(1_000)));
        assert_eq!(backlog[0].value, json!(2));
        assert!(backlog[0].is_newer_than(&backlog[1]));
        assert_eq!(store.read_latest("k").unwrap().value, json!(2));
    }

    #[test]
    fn test_memory_store_clock_going_backwards() {
        let clock = Arc::new(ManualClock::new(500));
        let store = MemoryRecordStore::with_clock(clock.clone());

        store.write(&key("k"), &json!("first"), None).unwrap();
        clock.set(100);
        let ts = store.write(&key("k"), &json!("second"), None).unwrap();

        assert_eq!(ts, Timestamp::from_millis(500));
        assert_eq!(store.read_latest("k").unwrap().value, json!("second"));
    }

    #[test]
    fn test_memory_store_keys_sorted() {
        let store = MemoryRecordStore::new();
        store.write(&key("b"), &json!(1), None).unwrap();
        store.write(&key("a"), &json!(1), None).unwrap();
        store.write(&key("b"), &json!(2), None).unwrap();

        assert_eq!(store.keys().unwrap(), vec![key("a"), key("b")]);
    }

    #[test]
    fn test_blob_store_dedup() {
        let blobs = MemoryBlobStore::new();
        let d1 = blobs.put(b"ABC").unwrap();
        let d2 = blobs.put(b"ABC").unwrap();

        assert_eq!(d1, d2);
        assert_eq!(d1, Digest::of(b"ABC"));
        assert_eq!(blobs.len().unwrap(), 1);
        assert_eq!(blobs.get(&d1).unwrap().as_ref(), b"ABC");
    }

    #[test]
    fn test_blob_store_missing() {
        let blobs = MemoryBlobStore::new();
        let digest = Digest::of(b"nope");
        assert!(blobs.is_empty().unwrap());
        assert!(!blobs.contains(&digest).unwrap());
        assert!(matches!(blobs.get(&digest), Err(StoreError::BlobNotFound(d)) if d == digest));
    }
}
