//! Store traits: the abstract interface for record and attachment persistence.
//!
//! The facade is backend-agnostic. Implementations include SQLite plus a
//! directory of blobs (durable) and in-memory maps (tests, embedding).

use bytes::Bytes;
use depot_core::{encode_value, Digest, Key, Record, Timestamp, Value};

use crate::error::Result;

/// Newest-first history of a single key.
///
/// Produced fresh by every [`RecordStore::backlog`] call; it holds no
/// reference to the store, so dropping or exhausting it affects nothing else.
#[derive(Debug, Clone)]
pub struct Backlog {
    records: std::vec::IntoIter<Record>,
}

impl Backlog {
    /// Wrap records that are already sorted newest-first.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: records.into_iter(),
        }
    }
}

impl Iterator for Backlog {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        self.records.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

impl ExactSizeIterator for Backlog {}

/// Append-only, versioned mapping from key to history.
///
/// All implementations must satisfy these invariants:
/// - `write` always appends; existing versions are never modified.
/// - Timestamps of one key never decrease. Versions with equal timestamps
///   are ordered by insertion.
/// - `read_latest` and `backlog` fail with `NotFound` for keys without
///   records, including the empty key.
/// - A record is fully written before any reader can observe it.
pub trait RecordStore: Send + Sync {
    /// Append a new version of `key` whose value is already encoded with
    /// [`encode_value`], and return its assigned timestamp.
    fn append(
        &self,
        key: &Key,
        encoded: Vec<u8>,
        attachment: Option<Digest>,
    ) -> Result<Timestamp>;

    /// Encode `value` and append it.
    fn write(&self, key: &Key, value: &Value, attachment: Option<Digest>) -> Result<Timestamp> {
        self.append(key, encode_value(value)?, attachment)
    }

    /// The newest version of `key`.
    fn read_latest(&self, key: &str) -> Result<Record>;

    /// Every version of `key`, newest first.
    fn backlog(&self, key: &str) -> Result<Backlog>;

    /// Number of versions of `key` (0 when unknown).
    fn count(&self, key: &str) -> Result<usize>;

    /// All keys with at least one record, sorted.
    fn keys(&self) -> Result<Vec<Key>>;
}

/// Content-addressed attachment store.
///
/// - Blobs are immutable; the same bytes always map to the same digest.
/// - `put` is idempotent and safe to call concurrently with identical bytes.
/// - Blobs are never deleted.
pub trait BlobStore: Send + Sync {
    /// Store `bytes` if absent and return their digest.
    fn put(&self, bytes: &[u8]) -> Result<Digest>;

    /// Fetch a blob by digest. Fails with `BlobNotFound` when unknown.
    fn get(&self, digest: &Digest) -> Result<Bytes>;

    /// Check whether a blob exists.
    fn contains(&self, digest: &Digest) -> Result<bool>;

    /// Number of distinct blobs stored.
    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
