// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Listener lifecycle: bind, serve until Ctrl-C, flush the store

use crate::config::{ConfigError, ServerConfig};
use crate::storage::StorageError;
use crate::store::SessionStore;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),

    #[error("Failed to flush store on shutdown: {0}")]
    Shutdown(#[from] StorageError),
}

/// Serve the gateway until Ctrl-C, then flush the store
pub async fn serve(config: &ServerConfig, store: Arc<SessionStore>) -> Result<(), GatewayError> {
    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| GatewayError::Bind {
            addr: addr.to_string(),
            source,
        })?;

    if !config.static_dir.is_dir() {
        log::warn!(
            "Static directory {:?} does not exist; only API routes will answer",
            config.static_dir
        );
    }

    let app = super::router(store.clone(), &config.static_dir);
    log::info!(
        "Starting server at http://{} ({} store, static files from {:?})",
        addr,
        store.storage_type(),
        config.static_dir
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.shutdown()?;
    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("Received Ctrl-C, shutting down"),
        Err(e) => {
            log::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await
        }
    }
}
