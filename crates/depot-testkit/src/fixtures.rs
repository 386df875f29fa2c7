//! Test fixtures.

use std::sync::Arc;

use depot::core::ManualClock;
use depot::{Depot, DepotConfig, Storage};
use tempfile::TempDir;

/// Start of every fixture clock, in Unix milliseconds.
pub const CLOCK_START: i64 = 1_700_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Memory,
    Sqlite,
}

/// A storage under test plus the clock that drives it.
pub struct Fixture {
    pub backend: Backend,
    pub storage: Arc<dyn Storage>,
    pub clock: Arc<ManualClock>,
    dir: Option<TempDir>,
}

impl Fixture {
    pub fn memory() -> Self {
        let clock = Arc::new(ManualClock::new(CLOCK_START));
        Self {
            backend: Backend::Memory,
            storage: Arc::new(Depot::memory_with_clock(clock.clone())),
            clock,
            dir: None,
        }
    }

    /// SQLite records and filesystem blobs in a fresh temp directory,
    /// removed when the fixture drops.
    pub fn sqlite() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let clock = Arc::new(ManualClock::new(CLOCK_START));
        let storage = open_sqlite(&dir, clock.clone());
        Self {
            backend: Backend::Sqlite,
            storage: Arc::new(storage),
            clock,
            dir: Some(dir),
        }
    }

    /// One fixture per backend.
    pub fn all() -> Vec<Self> {
        vec![Self::memory(), Self::sqlite()]
    }

    /// Reopen the storage over the same data. Memory fixtures have nothing
    /// to reopen and are returned unchanged.
    pub fn reopen(mut self) -> Self {
        let Some(dir) = self.dir.take() else {
            return self;
        };
        drop(self.storage);
        let storage = open_sqlite(&dir, self.clock.clone());
        Self {
            backend: self.backend,
            storage: Arc::new(storage),
            clock: self.clock,
            dir: Some(dir),
        }
    }

    /// Move the clock; negative steps move it backwards.
    pub fn tick(&self, millis: i64) {
        self.clock.advance(millis);
    }

    pub fn data_dir(&self) -> Option<&std::path::Path> {
        self.dir.as_ref().map(TempDir::path)
    }
}

fn open_sqlite(dir: &TempDir, clock: Arc<ManualClock>) -> depot::SqliteDepot {
    let config = DepotConfig::builder().data_dir(dir.path()).build();
    Depot::open_with_clock(&config, clock).expect("open sqlite depot")
}
