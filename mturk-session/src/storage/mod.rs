// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Persistent storage backends for the user table
//!
//! This module provides a trait-based abstraction over the `user` and
//! `completion` tables, allowing different storage backends to be used
//! interchangeably.
//!
//! # Architecture
//!
//! ```text
//! SessionStore (global lock, ordinal counter)
//!     ↓
//! UserTable (table abstraction)
//!     ↓
//! Concrete Implementations (SQLite, Sled, Memory)
//! ```

// Core modules
pub mod factory;
pub mod record;
pub mod traits;
pub mod types;

// Driver implementations
pub mod memory;
pub mod sled;
pub mod sqlite;

// Public API re-exports
pub use factory::open_user_table;
pub use record::{CompletionRecord, SessionFlag, UserRecord};
pub use traits::UserTable;
pub use types::{StorageError, StorageResult, StorageType};
