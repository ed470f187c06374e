// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! MTurk session server entry point

use clap::Parser;
use colored::Colorize;
use mturk_session::ServerConfig;

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments first to get log level
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else if let Some(level) = cli.log_level {
        level.to_level_filter()
    } else {
        // Info by default so every create attempt is on record
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    let config = ServerConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Version => {
            println!(
                "{} {}",
                mturk_session::CRATE_NAME.bold().green(),
                mturk_session::VERSION
            );
            Ok(())
        }

        Commands::Serve {
            store,
            bind,
            static_dir,
        } => cli::handle_serve(config, store, bind, static_dir),

        Commands::Init { store } => cli::handle_init(config, store),
    }
}
