//! Configuration for a durable Depot.

use std::path::{Path, PathBuf};

use depot_core::Limits;
use serde::{Deserialize, Serialize};

/// Where and how a SQLite-backed Depot keeps its data.
///
/// ```text
/// {data_dir}/
///   ├── {database_file}   (records)
///   └── {blobs_dir}/      (attachments, sharded by digest)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepotConfig {
    pub data_dir: PathBuf,
    pub database_file: String,
    pub blobs_dir: String,
    pub limits: Limits,
}

impl Default for DepotConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            database_file: "depot.sqlite".to_string(),
            blobs_dir: "files".to_string(),
            limits: Limits::default(),
        }
    }
}

impl DepotConfig {
    pub fn builder() -> DepotConfigBuilder {
        DepotConfigBuilder::default()
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }

    pub fn blobs_path(&self) -> PathBuf {
        self.data_dir.join(&self.blobs_dir)
    }
}

/// Builder for DepotConfig
#[derive(Debug, Default)]
pub struct DepotConfigBuilder {
    config: DepotConfig,
}

impl DepotConfigBuilder {
    pub fn data_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.config.data_dir = path.as_ref().to_path_buf();
        self
    }

    pub fn database_file(mut self, name: impl Into<String>) -> Self {
        self.config.database_file = name.into();
        self
    }

    pub fn blobs_dir(mut self, name: impl Into<String>) -> Self {
        self.config.blobs_dir = name.into();
        self
    }

    pub fn limits(mut self, limits: Limits) -> Self {
        self.config.limits = limits;
        self
    }

    pub fn build(self) -> DepotConfig {
        self.config
    }
}
