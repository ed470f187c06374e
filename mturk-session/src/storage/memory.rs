// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory storage driver implementation for testing

use super::record::{CompletionRecord, SessionFlag, UserRecord};
use super::traits::UserTable;
use super::types::{StorageError, StorageResult, StorageType};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;

/// In-memory storage driver for testing
#[derive(Default)]
pub struct MemoryUserTable {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    /// user_id -> row
    users: HashMap<String, UserRecord>,
    /// session_id -> user_id
    sessions: HashMap<String, String>,
    /// (session_id, channel) -> entry
    completions: HashMap<(String, String), CompletionRecord>,
}

impl MemoryUserTable {
    /// Create a new memory storage driver
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserTable for MemoryUserTable {
    fn open<P: AsRef<Path>>(_path: P) -> StorageResult<Self> {
        Ok(Self::new())
    }

    fn find_session_id(&self, user_id: &str) -> StorageResult<Option<String>> {
        Ok(self
            .tables
            .read()
            .users
            .get(user_id)
            .map(|row| row.session_id.clone()))
    }

    fn insert_user(&self, record: &UserRecord) -> StorageResult<()> {
        let mut tables = self.tables.write();
        if tables.users.contains_key(&record.user_id) {
            return Err(StorageError::Duplicate(format!(
                "user_id '{}'",
                record.user_id
            )));
        }
        if tables.sessions.contains_key(&record.session_id) {
            return Err(StorageError::Duplicate(format!(
                "session_id '{}'",
                record.session_id
            )));
        }
        tables
            .sessions
            .insert(record.session_id.clone(), record.user_id.clone());
        tables.users.insert(record.user_id.clone(), record.clone());
        Ok(())
    }

    fn get_by_session(&self, session_id: &str) -> StorageResult<Option<UserRecord>> {
        let tables = self.tables.read();
        Ok(tables
            .sessions
            .get(session_id)
            .and_then(|user_id| tables.users.get(user_id))
            .cloned())
    }

    fn update_channel(&self, session_id: &str, channel: &str) -> StorageResult<bool> {
        let mut tables = self.tables.write();
        let Some(user_id) = tables.sessions.get(session_id).cloned() else {
            return Ok(false);
        };
        match tables.users.get_mut(&user_id) {
            Some(row) => {
                row.set_channel(channel);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn update_flag(
        &self,
        session_id: &str,
        flag: SessionFlag,
        value: i64,
    ) -> StorageResult<bool> {
        let mut tables = self.tables.write();
        let Some(user_id) = tables.sessions.get(session_id).cloned() else {
            return Ok(false);
        };
        match tables.users.get_mut(&user_id) {
            Some(row) => {
                row.set_flag(flag, value);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn find_completion(
        &self,
        session_id: &str,
        channel: &str,
    ) -> StorageResult<Option<CompletionRecord>> {
        Ok(self
            .tables
            .read()
            .completions
            .get(&(session_id.to_string(), channel.to_string()))
            .cloned())
    }

    fn count_completions(&self, session_id: &str) -> StorageResult<u32> {
        let count = self
            .tables
            .read()
            .completions
            .keys()
            .filter(|(sid, _)| sid == session_id)
            .count();
        Ok(count as u32)
    }

    fn insert_completion(&self, record: &CompletionRecord) -> StorageResult<()> {
        let mut tables = self.tables.write();
        let key = (record.session_id.clone(), record.channel.clone());
        if tables.completions.contains_key(&key) {
            return Err(StorageError::Duplicate(format!(
                "completion '{}'/'{}'",
                record.session_id, record.channel
            )));
        }
        tables.completions.insert(key, record.clone());
        Ok(())
    }

    fn list_completions(&self, session_id: &str) -> StorageResult<Vec<CompletionRecord>> {
        let tables = self.tables.read();
        let mut entries: Vec<CompletionRecord> = tables
            .completions
            .values()
            .filter(|entry| entry.session_id == session_id)
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.order_num);
        Ok(entries)
    }

    fn user_count(&self) -> StorageResult<usize> {
        Ok(self.tables.read().users.len())
    }

    fn flush(&self) -> StorageResult<()> {
        // No-op for memory storage
        Ok(())
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(session_id: &str, user_id: &str) -> UserRecord {
        UserRecord::new(session_id.to_string(), user_id.to_string(), String::new(), 1)
    }

    #[test]
    fn test_insert_and_find() {
        let table = MemoryUserTable::new();
        table.insert_user(&row("s1", "alice")).unwrap();

        assert_eq!(table.find_session_id("alice").unwrap().as_deref(), Some("s1"));
        assert_eq!(table.find_session_id("bob").unwrap(), None);
        assert_eq!(table.user_count().unwrap(), 1);
    }

    #[test]
    fn test_duplicate_user_id_is_rejected() {
        let table = MemoryUserTable::new();
        table.insert_user(&row("s1", "alice")).unwrap();

        let err = table.insert_user(&row("s2", "alice")).unwrap_err();
        assert!(err.is_duplicate());
        // The original row is untouched
        assert_eq!(table.find_session_id("alice").unwrap().as_deref(), Some("s1"));
        assert!(table.get_by_session("s2").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_session_id_is_rejected() {
        let table = MemoryUserTable::new();
        table.insert_user(&row("s1", "alice")).unwrap();

        let err = table.insert_user(&row("s1", "bob")).unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(table.user_count().unwrap(), 1);
    }

    #[test]
    fn test_completions_are_ordered() {
        let table = MemoryUserTable::new();
        table
            .insert_completion(&CompletionRecord::new("s1", "b", 2))
            .unwrap();
        table
            .insert_completion(&CompletionRecord::new("s1", "a", 1))
            .unwrap();
        table
            .insert_completion(&CompletionRecord::new("s2", "c", 1))
            .unwrap();

        let channels: Vec<String> = table
            .list_completions("s1")
            .unwrap()
            .into_iter()
            .map(|entry| entry.channel)
            .collect();
        assert_eq!(channels, vec!["a", "b"]);
        assert_eq!(table.count_completions("s1").unwrap(), 2);
    }
}
