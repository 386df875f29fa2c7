//! HTTP server for Depot.
//!
//! Exposes a [`Storage`](depot::Storage) over the `/message` API. This layer
//! only parses requests and maps errors to status codes; all storage
//! semantics live in the `depot` crate.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::{BackendKind, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use router::{build_router, AppState};
pub use server::DepotServer;
