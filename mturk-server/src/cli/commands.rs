// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Command-line definitions

use clap::{Parser, Subcommand};
use mturk_session::StorageType;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mturk-server", version, about = "Session backend for MTurk experiments")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<log::Level>,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Store selection shared by every command that opens the database
#[derive(clap::Args, Debug, Clone, Default)]
pub struct StoreArgs {
    /// Storage driver (sqlite, sled, memory)
    #[arg(long)]
    pub storage: Option<StorageType>,

    /// SQLite file or Sled directory
    #[arg(long)]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        #[command(flatten)]
        store: StoreArgs,

        /// Address to listen on, e.g. 0.0.0.0:8080
        #[arg(long)]
        bind: Option<String>,

        /// Directory of static experiment assets
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Create the tables and report how many participants are stored
    Init {
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Show version information
    Version,
}
