// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Storage driver factory
//!
//! Picks the user-table driver named by the configuration and opens it.

use super::memory::MemoryUserTable;
use super::sled::SledUserTable;
use super::sqlite::SqliteUserTable;
use super::traits::UserTable;
use super::types::{StorageResult, StorageType};
use std::path::Path;

/// Factory function to create a user-table driver based on configuration
///
/// # Arguments
/// * `storage_type` - The type of storage driver to create
/// * `path` - SQLite database file, or Sled directory. Ignored for memory.
///
/// # Examples
/// ```ignore
/// let table = open_user_table(StorageType::Sqlite, "data/mturk.db")?;
/// let store = SessionStore::new(table);
/// ```
pub fn open_user_table<P: AsRef<Path>>(
    storage_type: StorageType,
    path: P,
) -> StorageResult<Box<dyn UserTable>> {
    log::info!(
        "Opening {} user table at {:?}",
        storage_type,
        path.as_ref()
    );
    match storage_type {
        StorageType::Sqlite => Ok(Box::new(SqliteUserTable::open(path)?)),
        StorageType::Sled => Ok(Box::new(SledUserTable::open(path)?)),
        StorageType::Memory => Ok(Box::new(MemoryUserTable::open(path)?)),
    }
}
