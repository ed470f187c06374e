// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! MTurk Session - session issuing backend for crowd-sourced experiments
//!
//! Each participant arriving with a worker id receives exactly one session
//! id; a second arrival with the same worker id is turned away with the
//! `error` sentinel. Sessions live in a `user` table behind a pluggable
//! driver, and the HTTP gateway also serves the experiment's static files.
//!
//! # Usage
//!
//! ```bash
//! # Create the tables
//! mturk-server init --db-path data/mturk.db
//!
//! # Serve the experiment
//! mturk-server serve --static-dir server/static
//!
//! # A participant arrives
//! curl 'http://localhost:8080/create?user_id=A1B2C3&current_hash=x'
//! ```

pub mod config;
pub mod gateway;
pub mod storage;
pub mod store;

pub use config::{ConfigError, ServerConfig};
pub use gateway::{router, serve, GatewayError};
pub use storage::{
    open_user_table, SessionFlag, StorageError, StorageResult, StorageType, UserRecord, UserTable,
};
pub use store::{CreateOutcome, RejectReason, SessionStore, ERROR_SENTINEL};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
