// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for the session server
//!
//! Provides the HTTP server entry point and store initialization.

pub mod commands;
pub mod handlers;

pub use commands::{Cli, Commands};
pub use handlers::{handle_init, handle_serve};
