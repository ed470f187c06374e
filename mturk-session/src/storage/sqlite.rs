// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! SQLite storage driver implementation
//!
//! The only driver with a real relational schema. Uniqueness on `user_id`,
//! `session_id` and `(session_id, channel)` is enforced by SQLite itself and
//! surfaces as `StorageError::Duplicate`.

use super::record::{CompletionRecord, SessionFlag, UserRecord};
use super::traits::UserTable;
use super::types::{StorageResult, StorageType};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::Path;

const CREATE_USER_TABLE: &str = "CREATE TABLE IF NOT EXISTS user (
    session_id      VARCHAR(32)  NOT NULL,
    user_id         VARCHAR(256) NOT NULL,
    current_hash    VARCHAR(256) NOT NULL DEFAULT '',
    current_channel VARCHAR(256) NOT NULL DEFAULT '',
    order_num       VARCHAR(256) NOT NULL DEFAULT '',
    cannot_load     INTEGER      NOT NULL DEFAULT 0,
    replay          INTEGER      NOT NULL DEFAULT 0,
    play_comment    INTEGER      NOT NULL DEFAULT 0,
    created         TIMESTAMP    NOT NULL,
    updated         TIMESTAMP    NOT NULL,
    UNIQUE (session_id),
    PRIMARY KEY (user_id)
);";

const CREATE_COMPLETION_TABLE: &str = "CREATE TABLE IF NOT EXISTS completion (
    session_id VARCHAR(32)  NOT NULL,
    channel    VARCHAR(256) NOT NULL,
    order_num  INTEGER      NOT NULL,
    created    TIMESTAMP    NOT NULL,
    updated    TIMESTAMP    NOT NULL,
    PRIMARY KEY (session_id, channel)
);";

const USER_COLUMNS: &str = "session_id, user_id, current_hash, current_channel, order_num, \
     cannot_load, replay, play_comment, created, updated";

/// SQLite driver holding a single connection
pub struct SqliteUserTable {
    conn: Mutex<Connection>,
}

impl SqliteUserTable {
    /// Private in-memory database, used by tests
    pub fn in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::bootstrap(conn)
    }

    fn bootstrap(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch(CREATE_USER_TABLE)?;
        conn.execute_batch(CREATE_COMPLETION_TABLE)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn map_user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRecord> {
        Ok(UserRecord {
            session_id: row.get(0)?,
            user_id: row.get(1)?,
            current_hash: row.get(2)?,
            current_channel: row.get(3)?,
            order_num: row.get(4)?,
            cannot_load: row.get(5)?,
            replay: row.get(6)?,
            play_comment: row.get(7)?,
            created: row.get(8)?,
            updated: row.get(9)?,
        })
    }

    fn map_completion_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CompletionRecord> {
        Ok(CompletionRecord {
            session_id: row.get(0)?,
            channel: row.get(1)?,
            order_num: row.get(2)?,
            created: row.get(3)?,
            updated: row.get(4)?,
        })
    }
}

impl UserTable for SqliteUserTable {
    fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE;
        let conn = Connection::open_with_flags(path, flags)?;
        log::debug!("Opened SQLite user table at {:?}", path);
        Self::bootstrap(conn)
    }

    fn find_session_id(&self, user_id: &str) -> StorageResult<Option<String>> {
        let conn = self.conn.lock();
        let session_id = conn
            .query_row(
                "SELECT session_id FROM user WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(session_id)
    }

    fn insert_user(&self, record: &UserRecord) -> StorageResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            &format!(
                "INSERT INTO user ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                USER_COLUMNS
            ),
            params![
                record.session_id,
                record.user_id,
                record.current_hash,
                record.current_channel,
                record.order_num,
                record.cannot_load,
                record.replay,
                record.play_comment,
                record.created,
                record.updated,
            ],
        )?;
        Ok(())
    }

    fn get_by_session(&self, session_id: &str) -> StorageResult<Option<UserRecord>> {
        let conn = self.conn.lock();
        let record = conn
            .query_row(
                &format!("SELECT {} FROM user WHERE session_id = ?1", USER_COLUMNS),
                params![session_id],
                Self::map_user_row,
            )
            .optional()?;
        Ok(record)
    }

    fn update_channel(&self, session_id: &str, channel: &str) -> StorageResult<bool> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE user SET current_channel = ?1, updated = ?2 WHERE session_id = ?3",
            params![channel, Utc::now(), session_id],
        )?;
        Ok(changed > 0)
    }

    fn update_flag(
        &self,
        session_id: &str,
        flag: SessionFlag,
        value: i64,
    ) -> StorageResult<bool> {
        let conn = self.conn.lock();
        // Column names come from a closed enum, never from input
        let changed = conn.execute(
            &format!(
                "UPDATE user SET {} = ?1, updated = ?2 WHERE session_id = ?3",
                flag.column()
            ),
            params![value, Utc::now(), session_id],
        )?;
        Ok(changed > 0)
    }

    fn find_completion(
        &self,
        session_id: &str,
        channel: &str,
    ) -> StorageResult<Option<CompletionRecord>> {
        let conn = self.conn.lock();
        let record = conn
            .query_row(
                "SELECT session_id, channel, order_num, created, updated
                 FROM completion WHERE session_id = ?1 AND channel = ?2",
                params![session_id, channel],
                Self::map_completion_row,
            )
            .optional()?;
        Ok(record)
    }

    fn count_completions(&self, session_id: &str) -> StorageResult<u32> {
        let conn = self.conn.lock();
        let count: u32 = conn.query_row(
            "SELECT COUNT(*) FROM completion WHERE session_id = ?1",
            params![session_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn insert_completion(&self, record: &CompletionRecord) -> StorageResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO completion (session_id, channel, order_num, created, updated)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.session_id,
                record.channel,
                record.order_num,
                record.created,
                record.updated,
            ],
        )?;
        Ok(())
    }

    fn list_completions(&self, session_id: &str) -> StorageResult<Vec<CompletionRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT session_id, channel, order_num, created, updated
             FROM completion WHERE session_id = ?1 ORDER BY order_num ASC",
        )?;
        let rows = stmt.query_map(params![session_id], Self::map_completion_row)?;
        let entries = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn user_count(&self) -> StorageResult<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM user", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn flush(&self) -> StorageResult<()> {
        // Every statement autocommits
        Ok(())
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Sqlite
    }
}
