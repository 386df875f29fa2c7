//! # Depot Testkit
//!
//! Testing utilities for Depot.
//!
//! ## Overview
//!
//! - **Fixtures**: a [`Storage`](depot::Storage) on a manual clock, backed by
//!   memory or by SQLite in a temp directory
//! - **Generators**: Proptest strategies for keys, values and attachments
//! - **Conformance**: checks every backend must pass
//!
//! ## Conformance
//!
//! ```rust
//! use depot_testkit::{conformance, Fixture};
//!
//! for fixture in Fixture::all() {
//!     conformance::run_all(&fixture);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use depot_testkit::generators::json_value;
//!
//! proptest! {
//!     #[test]
//!     fn value_survives_storage(value in json_value()) {
//!         let fixture = depot_testkit::Fixture::memory();
//!         fixture.storage.write("k", &value, None).unwrap();
//!         prop_assert_eq!(fixture.storage.read("k").unwrap(), value);
//!     }
//! }
//! ```

pub mod conformance;
pub mod fixtures;
pub mod generators;

pub use fixtures::{Backend, Fixture};
