//! Records: one version of a key.

use serde::Serialize;

use crate::digest::Digest;
use crate::types::{Key, Timestamp};
use crate::Value;

/// A single, immutable version of a key.
///
/// Versions of the same key are ordered by `(timestamp, seq)`. `seq` is the
/// backend's insertion counter and only matters when two versions share a
/// timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub key: Key,
    pub timestamp: Timestamp,
    #[serde(skip)]
    pub seq: u64,
    pub value: Value,
    pub attachment: Option<Digest>,
}

impl Record {
    /// The ordering position of this record within its key's history.
    pub fn version(&self) -> (Timestamp, u64) {
        (self.timestamp, self.seq)
    }

    /// Whether this record is newer than `other`.
    pub fn is_newer_than(&self, other: &Record) -> bool {
        self.version() > other.version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(ts: i64, seq: u64) -> Record {
        Record {
            key: Key::new("k").unwrap(),
            timestamp: Timestamp::from_millis(ts),
            seq,
            value: json!(seq),
            attachment: None,
        }
    }

    #[test]
    fn test_timestamp_dominates_ordering() {
        assert!(record(2, 1).is_newer_than(&record(1, 9)));
    }

    #[test]
    fn test_seq_breaks_timestamp_ties() {
        assert!(record(5, 2).is_newer_than(&record(5, 1)));
        assert!(!record(5, 1).is_newer_than(&record(5, 2)));
    }

    #[test]
    fn test_serialized_form() {
        let mut r = record(7, 3);
        r.attachment = Some(Digest::from_bytes([0x01; 32]));
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["key"], "k");
        assert_eq!(json["timestamp"], 7);
        assert_eq!(json["attachment"], "01".repeat(32));
        assert!(json.get("seq").is_none());
    }
}
