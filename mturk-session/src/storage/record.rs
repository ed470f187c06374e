// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Row types for the `user` and `completion` tables

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One participant row in the `user` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// 32 lowercase hex characters, unique
    pub session_id: String,
    /// External identity (worker id), primary key
    pub user_id: String,
    /// Hash the participant arrived with
    pub current_hash: String,
    /// Channel the participant is currently working on
    pub current_channel: String,
    /// Ordinal assigned at creation, stored as decimal text
    pub order_num: String,
    pub cannot_load: i64,
    pub replay: i64,
    pub play_comment: i64,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl UserRecord {
    /// Build the row inserted by a successful create
    pub fn new(session_id: String, user_id: String, current_hash: String, ordinal: u64) -> Self {
        let now = Utc::now();
        Self {
            session_id,
            user_id,
            current_hash,
            current_channel: String::new(),
            order_num: ordinal.to_string(),
            cannot_load: 0,
            replay: 0,
            play_comment: 0,
            created: now,
            updated: now,
        }
    }

    /// Current value of a flag column
    pub fn flag(&self, flag: SessionFlag) -> i64 {
        match flag {
            SessionFlag::CannotLoad => self.cannot_load,
            SessionFlag::Replay => self.replay,
            SessionFlag::PlayComment => self.play_comment,
        }
    }

    pub(crate) fn set_flag(&mut self, flag: SessionFlag, value: i64) {
        match flag {
            SessionFlag::CannotLoad => self.cannot_load = value,
            SessionFlag::Replay => self.replay = value,
            SessionFlag::PlayComment => self.play_comment = value,
        }
        self.updated = Utc::now();
    }

    pub(crate) fn set_channel(&mut self, channel: &str) {
        self.current_channel = channel.to_string();
        self.updated = Utc::now();
    }
}

/// Integer flag columns on the user row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionFlag {
    /// The participant reported the stimulus would not load
    CannotLoad,
    /// The participant asked to watch the stimulus again
    Replay,
    /// The participant played the comment prompt
    PlayComment,
}

impl SessionFlag {
    /// Column name in the `user` table
    pub fn column(&self) -> &'static str {
        match self {
            SessionFlag::CannotLoad => "cannot_load",
            SessionFlag::Replay => "replay",
            SessionFlag::PlayComment => "play_comment",
        }
    }
}

/// One finished channel for a session in the `completion` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub session_id: String,
    pub channel: String,
    /// 1-based position among this session's completions
    pub order_num: u32,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl CompletionRecord {
    pub fn new(session_id: &str, channel: &str, order_num: u32) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.to_string(),
            channel: channel.to_string(),
            order_num,
            created: now,
            updated: now,
        }
    }
}
