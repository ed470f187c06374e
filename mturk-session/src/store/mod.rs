// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Session management for experiment participants
//!
//! This module provides:
//! - Session creation with re-entry rejection per identity
//! - The process-local ordinal attached to each create attempt
//! - Per-session state: current channel, flags, completed channels
//!
//! The store is an explicit object shared through `Arc`, never a global.

pub mod manager;
pub mod outcome;

pub use manager::{new_session_id, SessionStore};
pub use outcome::{CreateOutcome, RejectReason, ERROR_SENTINEL};
