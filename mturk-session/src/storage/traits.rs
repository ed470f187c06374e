// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Storage driver traits
//!
//! Every driver exposes the `user` and `completion` tables through
//! [`UserTable`]. Drivers do no locking of their own beyond what they need to
//! be `Sync`; the session store serializes all calls.

use super::record::{CompletionRecord, SessionFlag, UserRecord};
use super::types::{StorageResult, StorageType};
use std::path::Path;

/// Main storage driver trait
pub trait UserTable: Send + Sync {
    /// Open or create the tables at the given path
    fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self>
    where
        Self: Sized;

    /// Session id of the row owned by `user_id`, if any
    fn find_session_id(&self, user_id: &str) -> StorageResult<Option<String>>;

    /// Insert a new user row
    ///
    /// Must fail with `StorageError::Duplicate` when `user_id` or
    /// `session_id` already exists, and must not modify the existing row.
    fn insert_user(&self, record: &UserRecord) -> StorageResult<()>;

    /// Full row for a session id
    fn get_by_session(&self, session_id: &str) -> StorageResult<Option<UserRecord>>;

    /// Set `current_channel`; false when the session is unknown
    fn update_channel(&self, session_id: &str, channel: &str) -> StorageResult<bool>;

    /// Set a flag column; false when the session is unknown
    fn update_flag(&self, session_id: &str, flag: SessionFlag, value: i64)
        -> StorageResult<bool>;

    /// Completion entry for `(session_id, channel)`, if any
    fn find_completion(
        &self,
        session_id: &str,
        channel: &str,
    ) -> StorageResult<Option<CompletionRecord>>;

    /// Number of completion entries recorded for a session
    fn count_completions(&self, session_id: &str) -> StorageResult<u32>;

    /// Insert a completion entry, `StorageError::Duplicate` if the key exists
    fn insert_completion(&self, record: &CompletionRecord) -> StorageResult<()>;

    /// Completion entries for a session ordered by `order_num`
    fn list_completions(&self, session_id: &str) -> StorageResult<Vec<CompletionRecord>>;

    /// Number of rows in the user table
    fn user_count(&self) -> StorageResult<usize>;

    /// Flush pending writes to disk
    fn flush(&self) -> StorageResult<()>;

    /// Get storage type
    fn storage_type(&self) -> StorageType;
}
