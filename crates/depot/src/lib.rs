//! # Depot
//!
//! An append-only, versioned key-value message store with optional binary
//! attachments addressed by content hash.
//!
//! ## Overview
//!
//! - **Records**: every write appends a new version of a key. Nothing is ever
//!   updated or deleted.
//! - **Backlog**: the full history of a key, newest first.
//! - **Attachments**: raw bytes stored once per unique Blake3 digest and
//!   referenced from records.
//!
//! ## Usage
//!
//! ```rust
//! use depot::{Depot, Storage, Value};
//!
//! let depot = Depot::memory();
//! depot.write("x", &Value::from(1), None).unwrap();
//! depot.write("x", &Value::from(2), Some(b"ABC".as_slice())).unwrap();
//!
//! assert_eq!(depot.read("x").unwrap(), Value::from(2));
//!
//! let values: Vec<Value> = depot.backlog("x").unwrap().map(|e| e.value).collect();
//! assert_eq!(values, vec![Value::from(2), Value::from(1)]);
//!
//! assert!(depot.read("missing").unwrap_err().is_not_found());
//! ```
//!
//! ## Backends
//!
//! [`Depot`] is generic over a [`RecordStore`](store::RecordStore) and a
//! [`BlobStore`](store::BlobStore). Two pairings ship ready-made:
//!
//! - [`MemoryDepot`] via [`Depot::memory`]
//! - [`SqliteDepot`] (SQLite records, sharded blob directory) via [`Depot::open`]
//!
//! Every backend satisfies the same [`Storage`] contract.
//!
//! ## Re-exports
//!
//! - `depot::core` - Core primitives (Key, Digest, Record, ...)
//! - `depot::store` - Store traits and backends

pub mod config;
pub mod depot;
pub mod error;

pub use depot_core as core;
pub use depot_store as store;

pub use config::{DepotConfig, DepotConfigBuilder};
pub use depot::{Depot, Entry, History, MemoryDepot, SqliteDepot, Storage};
pub use error::{Error, ErrorKind, Result};

pub use depot_core::{Digest, Key, Limits, Timestamp, ValidationError, Value};
