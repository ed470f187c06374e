// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Storage driver types and error handling
//!
//! This module defines the driver selector and the error type shared by every
//! user-table driver.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// Storage driver type configuration
///
/// Specifies which underlying storage technology backs the user table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// SQLite - relational tables with real uniqueness constraints
    /// Best for: production use, inspecting results with SQL
    #[default]
    Sqlite,

    /// Sled - Pure Rust embedded key-value database
    /// Best for: deployments without a C toolchain
    Sled,

    /// Memory - In-memory storage, lost on restart
    /// Best for: Unit testing, development
    Memory,
}

impl std::str::FromStr for StorageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(StorageType::Sqlite),
            "sled" => Ok(StorageType::Sled),
            "memory" => Ok(StorageType::Memory),
            _ => Err(format!(
                "Unknown storage type: {}. Valid options: sqlite, sled, memory",
                s
            )),
        }
    }
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StorageType::Sqlite => "sqlite",
            StorageType::Sled => "sled",
            StorageType::Memory => "memory",
        };
        write!(f, "{}", name)
    }
}

/// Error type for storage driver operations
///
/// `Duplicate` is reserved for uniqueness violations on `user_id`,
/// `session_id` or a completion key. Every other failure is a fault.
#[derive(Error, Debug)]
pub enum StorageError {
    /// A uniqueness constraint rejected the write
    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    /// I/O related errors (file system)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Row encoding or decoding failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Driver-specific error (SQLite, Sled)
    #[error("Storage driver error: {0}")]
    Backend(String),
}

impl StorageError {
    /// True when the error came from a uniqueness constraint
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StorageError::Duplicate(_))
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        match e {
            rusqlite::Error::SqliteFailure(ref err, ref msg)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StorageError::Duplicate(msg.clone().unwrap_or_else(|| err.to_string()))
            }
            other => StorageError::Backend(other.to_string()),
        }
    }
}

impl From<sled::Error> for StorageError {
    fn from(e: sled::Error) -> Self {
        match e {
            sled::Error::Io(io) => StorageError::Io(io),
            other => StorageError::Backend(other.to_string()),
        }
    }
}

impl From<bincode::Error> for StorageError {
    fn from(e: bincode::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// Result type for storage driver operations
pub type StorageResult<T> = Result<T, StorageError>;
