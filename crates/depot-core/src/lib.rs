//! # Depot Core
//!
//! Pure primitives for Depot: keys, timestamps, digests, records and the
//! value codec.
//!
//! This crate contains no I/O and no storage. It defines the vocabulary the
//! store backends and the storage facade share.
//!
//! ## Key Types
//!
//! - [`Key`] - Validated, non-empty record key
//! - [`Timestamp`] - Unix milliseconds assigned at write time
//! - [`Digest`] - Content address of an attachment (Blake3)
//! - [`Record`] - One version of a key
//! - [`Clock`] - Source of write timestamps
//!
//! ## Values
//!
//! Record values are JSON-compatible ([`Value`]) and are persisted through the
//! CBOR codec in [`codec`], which preserves object key order.

pub mod clock;
pub mod codec;
pub mod digest;
pub mod error;
pub mod record;
pub mod types;
pub mod validation;

pub use clock::{next_timestamp, Clock, ManualClock, SystemClock};
pub use codec::{decode_value, encode_value};
pub use digest::Digest;
pub use error::{CoreError, ValidationError};
pub use record::Record;
pub use types::{Key, Timestamp};
pub use validation::{validate_attachment, validate_key, validate_value, Limits};

/// The JSON-compatible payload type stored in records.
pub use serde_json::Value;
