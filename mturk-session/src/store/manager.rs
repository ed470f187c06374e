// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Session store: identity to session mapping over a user table
//!
//! One mutex guards the ordinal counter and is held across every table
//! operation, so the lookup-then-insert in [`SessionStore::create_session`]
//! can never interleave with another call in this process. The table's
//! uniqueness constraint backs it up: an insert conflict is a duplicate.

use crate::storage::{
    open_user_table, CompletionRecord, SessionFlag, StorageResult, StorageType, UserRecord,
    UserTable,
};
use crate::store::outcome::{CreateOutcome, RejectReason};
use parking_lot::Mutex;
use std::path::Path;

/// New session identifier: a v4 UUID as 32 lowercase hex characters
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Owns the user table and the process-local ordinal counter
pub struct SessionStore {
    table: Box<dyn UserTable>,
    /// Create attempts since this store was built. Not persisted.
    ordinal: Mutex<u64>,
}

impl SessionStore {
    /// Wrap an already opened table; the ordinal starts at 0
    pub fn new(table: Box<dyn UserTable>) -> Self {
        Self {
            table,
            ordinal: Mutex::new(0),
        }
    }

    /// Open the configured driver and wrap it
    pub fn open<P: AsRef<Path>>(storage_type: StorageType, path: P) -> StorageResult<Self> {
        Ok(Self::new(open_user_table(storage_type, path)?))
    }

    /// Store over a fresh in-memory table
    pub fn in_memory() -> Self {
        Self::new(Box::new(crate::storage::memory::MemoryUserTable::new()))
    }

    pub fn storage_type(&self) -> StorageType {
        self.table.storage_type()
    }

    /// Ordinal handed to the most recent create attempt
    pub fn current_ordinal(&self) -> u64 {
        *self.ordinal.lock()
    }

    /// Create a session for `user_id`, or reject it if one already exists
    ///
    /// The ordinal advances on every call, including rejected ones. Storage
    /// faults are logged and reported as `Rejected(StorageFault)`.
    pub fn create_session(&self, user_id: &str, current_hash: &str) -> CreateOutcome {
        let mut ordinal = self.ordinal.lock();
        *ordinal += 1;
        let n = *ordinal;

        match self.table.find_session_id(user_id) {
            Ok(Some(_)) => {
                log::info!("Rejected re-entry for user '{}' (n={})", user_id, n);
                return CreateOutcome::Rejected(RejectReason::DuplicateIdentity);
            }
            Ok(None) => {}
            Err(e) => {
                log::error!("Failed to look up user '{}' (n={}): {}", user_id, n, e);
                return CreateOutcome::Rejected(RejectReason::StorageFault);
            }
        }

        let record = UserRecord::new(
            new_session_id(),
            user_id.to_string(),
            current_hash.to_string(),
            n,
        );

        match self.table.insert_user(&record) {
            Ok(()) => {
                log::info!(
                    "Created session {} for user '{}' (n={})",
                    record.session_id,
                    user_id,
                    n
                );
                CreateOutcome::Created {
                    session_id: record.session_id,
                    ordinal: n,
                }
            }
            Err(e) if e.is_duplicate() => {
                log::warn!(
                    "Insert for user '{}' hit a uniqueness constraint (n={}): {}",
                    user_id,
                    n,
                    e
                );
                CreateOutcome::Rejected(RejectReason::DuplicateIdentity)
            }
            Err(e) => {
                log::error!("Failed to insert user '{}' (n={}): {}", user_id, n, e);
                CreateOutcome::Rejected(RejectReason::StorageFault)
            }
        }
    }

    /// Full row for a session
    pub fn lookup(&self, session_id: &str) -> StorageResult<Option<UserRecord>> {
        let _guard = self.ordinal.lock();
        self.table.get_by_session(session_id)
    }

    /// Channel the session is on, empty for an unknown session
    pub fn current_channel(&self, session_id: &str) -> StorageResult<String> {
        let _guard = self.ordinal.lock();
        Ok(self
            .table
            .get_by_session(session_id)?
            .map(|record| record.current_channel)
            .unwrap_or_default())
    }

    /// Move the session to `channel`; false for an unknown session
    pub fn select_channel(&self, session_id: &str, channel: &str) -> StorageResult<bool> {
        let _guard = self.ordinal.lock();
        let updated = self.table.update_channel(session_id, channel)?;
        log::debug!(
            "select_channel session={} channel={} updated={}",
            session_id,
            channel,
            updated
        );
        Ok(updated)
    }

    /// Raise a flag column to 1; false for an unknown session
    pub fn mark_flag(&self, session_id: &str, flag: SessionFlag) -> StorageResult<bool> {
        let _guard = self.ordinal.lock();
        self.table.update_flag(session_id, flag, 1)
    }

    /// Record that the session finished `channel`
    ///
    /// Returns the entry's order number. A repeated completion keeps its
    /// original number. `None` for an unknown session.
    pub fn complete_channel(&self, session_id: &str, channel: &str) -> StorageResult<Option<u32>> {
        let _guard = self.ordinal.lock();
        if self.table.get_by_session(session_id)?.is_none() {
            return Ok(None);
        }
        if let Some(existing) = self.table.find_completion(session_id, channel)? {
            log::debug!(
                "Completion {}/{} already recorded as #{}",
                session_id,
                channel,
                existing.order_num
            );
            return Ok(Some(existing.order_num));
        }

        let order_num = self.table.count_completions(session_id)? + 1;
        self.table
            .insert_completion(&CompletionRecord::new(session_id, channel, order_num))?;
        log::info!(
            "Session {} completed '{}' (#{})",
            session_id,
            channel,
            order_num
        );
        Ok(Some(order_num))
    }

    /// Channels the session finished, in completion order
    pub fn completed_channels(&self, session_id: &str) -> StorageResult<Vec<String>> {
        let _guard = self.ordinal.lock();
        Ok(self
            .table
            .list_completions(session_id)?
            .into_iter()
            .map(|entry| entry.channel)
            .collect())
    }

    pub fn user_count(&self) -> StorageResult<usize> {
        let _guard = self.ordinal.lock();
        self.table.user_count()
    }

    /// Flush the driver before the process exits
    pub fn shutdown(&self) -> StorageResult<()> {
        let _guard = self.ordinal.lock();
        log::info!("SessionStore shutting down");
        self.table.flush()
    }
}
