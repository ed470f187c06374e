// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI command handlers

use colored::Colorize;
use mturk_session::{ServerConfig, SessionStore};
use std::path::PathBuf;
use std::sync::Arc;

use super::commands::StoreArgs;

/// Apply command-line overrides on top of the loaded configuration
fn apply_store_args(config: &mut ServerConfig, store: StoreArgs) {
    if let Some(storage_type) = store.storage {
        config.storage_type = storage_type;
    }
    if let Some(db_path) = store.db_path {
        config.db_path = db_path;
    }
}

/// Handle the serve command
///
/// Failing to open the store or bind the port is fatal.
pub fn handle_serve(
    mut config: ServerConfig,
    store_args: StoreArgs,
    bind: Option<String>,
    static_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    apply_store_args(&mut config, store_args);
    if let Some(bind) = bind {
        config.bind = bind;
    }
    if let Some(static_dir) = static_dir {
        config.static_dir = static_dir;
    }

    let store = SessionStore::open(config.storage_type, &config.db_path)
        .map_err(|e| format!("Failed to open {} store: {}", config.storage_type, e))?;
    let store = Arc::new(store);

    println!(
        "{} {}",
        "Starting server at".bold().green(),
        config.bind.cyan()
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(mturk_session::serve(&config, store))?;
    Ok(())
}

/// Handle the init command
pub fn handle_init(
    mut config: ServerConfig,
    store_args: StoreArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    apply_store_args(&mut config, store_args);

    println!("{}", "Initializing session store...".bold().green());
    println!("  → Driver: {}", config.storage_type);
    println!("  → Path:   {:?}", config.db_path);

    let store = SessionStore::open(config.storage_type, &config.db_path)
        .map_err(|e| format!("Failed to initialize store: {}", e))?;
    let users = store.user_count()?;
    store.shutdown()?;

    println!("{}", "\nStore is ready.".bold().green());
    println!("  {} participant(s) on record", users);
    Ok(())
}
