//! Test utilities for session store integration tests
//!
//! `StoreFixture` owns a temporary directory so every test gets an isolated
//! database for the driver under test.

#![allow(dead_code)]

use mturk_session::{SessionStore, StorageType};
use std::path::PathBuf;
use std::sync::Arc;

/// Every driver the store must behave identically on
pub const ALL_DRIVERS: [StorageType; 3] =
    [StorageType::Sqlite, StorageType::Sled, StorageType::Memory];

/// Isolated store instance backed by a temporary directory
pub struct StoreFixture {
    pub store: Arc<SessionStore>,
    storage_type: StorageType,
    db_path: PathBuf,
    _temp_dir: tempfile::TempDir,
}

impl StoreFixture {
    pub fn new(storage_type: StorageType) -> Result<Self, Box<dyn std::error::Error>> {
        let temp_dir = tempfile::tempdir()?;
        let db_path = match storage_type {
            StorageType::Sqlite => temp_dir.path().join("mturk_test.db"),
            _ => temp_dir.path().join("mturk_test"),
        };
        let store = SessionStore::open(storage_type, &db_path)?;

        Ok(Self {
            store: Arc::new(store),
            storage_type,
            db_path,
            _temp_dir: temp_dir,
        })
    }

    pub fn storage_type(&self) -> StorageType {
        self.storage_type
    }

    /// Simulate a process restart: drop the store and open a new one on the
    /// same files
    pub fn restart(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.store.shutdown()?;
        let placeholder = Arc::new(SessionStore::in_memory());
        let old = std::mem::replace(&mut self.store, placeholder);
        drop(old);
        self.store = Arc::new(SessionStore::open(self.storage_type, &self.db_path)?);
        Ok(())
    }
}

/// Random worker id, unique enough for a single test
pub fn random_worker_id() -> String {
    format!("A{:012X}", fastrand::u64(..) & 0xFFFF_FFFF_FFFF)
}

/// Split a created wire string into (session_id, ordinal)
pub fn parse_wire(body: &str) -> Option<(String, u64)> {
    let (session_id, ordinal) = body.split_once("&n=")?;
    Some((session_id.to_string(), ordinal.parse().ok()?))
}
