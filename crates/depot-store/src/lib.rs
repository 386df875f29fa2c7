//! # Depot Store
//!
//! Storage abstraction for Depot. Records and attachments live behind two
//! traits so the facade never depends on a particular backend.
//!
//! ## Key Types
//!
//! - [`RecordStore`] - Append-only, versioned history per key
//! - [`BlobStore`] - Content-addressed attachment storage
//! - [`Backlog`] - Newest-first history of one key
//! - [`MemoryRecordStore`] / [`MemoryBlobStore`] - In-memory backends
//! - [`SqliteRecordStore`] - SQLite-backed records
//! - [`FsBlobStore`] - Sharded directory of attachment files
//!
//! ## Usage
//!
//! ```rust,no_run
//! use depot_core::{Key, Value};
//! use depot_store::{BlobStore, FsBlobStore, RecordStore, SqliteRecordStore};
//!
//! let records = SqliteRecordStore::open("depot.sqlite").unwrap();
//! let blobs = FsBlobStore::open("files").unwrap();
//!
//! let digest = blobs.put(b"raw attachment").unwrap();
//! let key = Key::new("sensor/1").unwrap();
//! records.write(&key, &Value::from(21.5), Some(digest)).unwrap();
//!
//! for record in records.backlog("sensor/1").unwrap() {
//!     println!("{} {}", record.timestamp, record.value);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Append-only**: records are never updated or deleted
//! - **Unknown keys are errors**: `read_latest` and `backlog` return
//!   `NotFound` rather than empty results
//! - **Idempotent puts**: storing the same bytes twice keeps one blob

pub mod error;
pub mod fs;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use fs::FsBlobStore;
pub use memory::{MemoryBlobStore, MemoryRecordStore};
pub use sqlite::SqliteRecordStore;
pub use traits::{Backlog, BlobStore, RecordStore};
