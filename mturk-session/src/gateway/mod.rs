// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! HTTP gateway
//!
//! Maps query-string requests onto [`SessionStore`] operations and serves
//! the experiment's static assets for every other path.

pub mod handlers;
pub mod server;

pub use server::{serve, GatewayError};

use crate::store::SessionStore;
use axum::routing::get;
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;

/// Build the application router
pub fn router<P: AsRef<Path>>(store: Arc<SessionStore>, static_dir: P) -> Router {
    Router::new()
        .route("/create", get(handlers::create))
        .route("/subject", get(handlers::subject))
        .route("/select", get(handlers::select))
        .route("/complete", get(handlers::complete))
        .route("/completed", get(handlers::completed))
        .route("/cannot_load", get(handlers::cannot_load))
        .route("/replay", get(handlers::replay))
        .route("/comment", get(handlers::comment))
        .fallback_service(ServeDir::new(static_dir.as_ref()))
        .with_state(store)
}
