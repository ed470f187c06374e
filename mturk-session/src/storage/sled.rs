// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Sled storage driver implementation
//!
//! Rows are bincode-encoded. The `user` tree is keyed by `user_id`, the
//! `user_session` tree maps `session_id` back to `user_id`, and the
//! `completion` tree is keyed by `session_id \0 channel`.

use super::record::{CompletionRecord, SessionFlag, UserRecord};
use super::traits::UserTable;
use super::types::{StorageError, StorageResult, StorageType};
use sled::transaction::{ConflictableTransactionError, TransactionError, TransactionResult};
use sled::Transactional;
use std::path::Path;

const USER_TREE: &str = "user";
const SESSION_TREE: &str = "user_session";
const COMPLETION_TREE: &str = "completion";

/// Sled driver implementation
pub struct SledUserTable {
    db: sled::Db,
    users: sled::Tree,
    sessions: sled::Tree,
    completions: sled::Tree,
}

fn completion_prefix(session_id: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(session_id.len() + 1);
    key.extend_from_slice(session_id.as_bytes());
    key.push(0);
    key
}

fn completion_key(session_id: &str, channel: &str) -> Vec<u8> {
    let mut key = completion_prefix(session_id);
    key.extend_from_slice(channel.as_bytes());
    key
}

impl SledUserTable {
    fn load_user(&self, user_id: &[u8]) -> StorageResult<Option<UserRecord>> {
        match self.users.get(user_id)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Apply `change` to the row owned by `session_id`; false when unknown
    fn modify_by_session<F>(&self, session_id: &str, change: F) -> StorageResult<bool>
    where
        F: FnOnce(&mut UserRecord),
    {
        let Some(user_id) = self.sessions.get(session_id.as_bytes())? else {
            return Ok(false);
        };
        let Some(mut record) = self.load_user(&user_id)? else {
            log::warn!(
                "Session index points at missing user row for session {}",
                session_id
            );
            return Ok(false);
        };
        change(&mut record);
        self.users.insert(user_id, bincode::serialize(&record)?)?;
        Ok(true)
    }
}

impl UserTable for SledUserTable {
    fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let db = sled::open(path)?;
        let users = db.open_tree(USER_TREE)?;
        let sessions = db.open_tree(SESSION_TREE)?;
        let completions = db.open_tree(COMPLETION_TREE)?;
        Ok(SledUserTable {
            db,
            users,
            sessions,
            completions,
        })
    }

    fn find_session_id(&self, user_id: &str) -> StorageResult<Option<String>> {
        Ok(self
            .load_user(user_id.as_bytes())?
            .map(|record| record.session_id))
    }

    fn insert_user(&self, record: &UserRecord) -> StorageResult<()> {
        let value = bincode::serialize(record)?;
        let result: TransactionResult<(), StorageError> = (&self.users, &self.sessions)
            .transaction(|(users, sessions)| {
                if users.get(record.user_id.as_bytes())?.is_some() {
                    return Err(ConflictableTransactionError::Abort(StorageError::Duplicate(
                        format!("user_id '{}'", record.user_id),
                    )));
                }
                if sessions.get(record.session_id.as_bytes())?.is_some() {
                    return Err(ConflictableTransactionError::Abort(StorageError::Duplicate(
                        format!("session_id '{}'", record.session_id),
                    )));
                }
                users.insert(record.user_id.as_bytes(), value.as_slice())?;
                sessions.insert(record.session_id.as_bytes(), record.user_id.as_bytes())?;
                Ok(())
            });

        result.map_err(|e| match e {
            TransactionError::Abort(e) => e,
            TransactionError::Storage(e) => e.into(),
        })
    }

    fn get_by_session(&self, session_id: &str) -> StorageResult<Option<UserRecord>> {
        match self.sessions.get(session_id.as_bytes())? {
            Some(user_id) => self.load_user(&user_id),
            None => Ok(None),
        }
    }

    fn update_channel(&self, session_id: &str, channel: &str) -> StorageResult<bool> {
        self.modify_by_session(session_id, |record| record.set_channel(channel))
    }

    fn update_flag(
        &self,
        session_id: &str,
        flag: SessionFlag,
        value: i64,
    ) -> StorageResult<bool> {
        self.modify_by_session(session_id, |record| record.set_flag(flag, value))
    }

    fn find_completion(
        &self,
        session_id: &str,
        channel: &str,
    ) -> StorageResult<Option<CompletionRecord>> {
        match self.completions.get(completion_key(session_id, channel))? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn count_completions(&self, session_id: &str) -> StorageResult<u32> {
        let mut count = 0u32;
        for entry in self.completions.scan_prefix(completion_prefix(session_id)) {
            entry?;
            count += 1;
        }
        Ok(count)
    }

    fn insert_completion(&self, record: &CompletionRecord) -> StorageResult<()> {
        let key = completion_key(&record.session_id, &record.channel);
        let value = bincode::serialize(record)?;
        match self
            .completions
            .compare_and_swap(key, None as Option<&[u8]>, Some(value))?
        {
            Ok(()) => Ok(()),
            Err(_) => Err(StorageError::Duplicate(format!(
                "completion '{}'/'{}'",
                record.session_id, record.channel
            ))),
        }
    }

    fn list_completions(&self, session_id: &str) -> StorageResult<Vec<CompletionRecord>> {
        let mut entries = Vec::new();
        for entry in self.completions.scan_prefix(completion_prefix(session_id)) {
            let (_, bytes) = entry?;
            entries.push(bincode::deserialize::<CompletionRecord>(&bytes)?);
        }
        entries.sort_by_key(|entry| entry.order_num);
        Ok(entries)
    }

    fn user_count(&self) -> StorageResult<usize> {
        Ok(self.users.len())
    }

    fn flush(&self) -> StorageResult<()> {
        self.db.flush()?;
        Ok(())
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Sled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn row(session_id: &str, user_id: &str) -> UserRecord {
        UserRecord::new(session_id.to_string(), user_id.to_string(), String::new(), 3)
    }

    #[test]
    fn test_duplicate_user_id_keeps_first_row() {
        let temp_dir = TempDir::new().unwrap();
        let table = SledUserTable::open(temp_dir.path()).unwrap();

        table.insert_user(&row("s1", "alice")).unwrap();
        let err = table.insert_user(&row("s2", "alice")).unwrap_err();

        assert!(err.is_duplicate());
        assert_eq!(table.find_session_id("alice").unwrap().as_deref(), Some("s1"));
        // The aborted transaction must not leave a dangling session index
        assert!(table.get_by_session("s2").unwrap().is_none());
    }

    #[test]
    fn test_completion_prefix_does_not_leak_between_sessions() {
        let temp_dir = TempDir::new().unwrap();
        let table = SledUserTable::open(temp_dir.path()).unwrap();

        table
            .insert_completion(&CompletionRecord::new("ab", "x", 1))
            .unwrap();
        table
            .insert_completion(&CompletionRecord::new("abc", "y", 1))
            .unwrap();

        assert_eq!(table.count_completions("ab").unwrap(), 1);
        assert_eq!(table.list_completions("abc").unwrap()[0].channel, "y");

        let err = table
            .insert_completion(&CompletionRecord::new("ab", "x", 2))
            .unwrap_err();
        assert!(err.is_duplicate());
    }

    #[test]
    fn test_rows_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();

        {
            let table = SledUserTable::open(temp_dir.path()).unwrap();
            table.insert_user(&row("s1", "alice")).unwrap();
            assert!(table.update_flag("s1", SessionFlag::CannotLoad, 1).unwrap());
            table.flush().unwrap();
        }

        let table = SledUserTable::open(temp_dir.path()).unwrap();
        let stored = table.get_by_session("s1").unwrap().unwrap();
        assert_eq!(stored.user_id, "alice");
        assert_eq!(stored.cannot_load, 1);
    }
}
