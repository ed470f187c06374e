// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Route handlers
//!
//! Every handler answers 200. Failures are logged and the body is the
//! `error` sentinel. Store calls run on the blocking pool because they hold
//! the store lock across a database round-trip.

use crate::storage::SessionFlag;
use crate::store::{SessionStore, ERROR_SENTINEL};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;

const OK_BODY: &str = "ok";

/// Query string pairs in arrival order
///
/// Lookups return the first value for a name, or `""` when the name is
/// absent, so a missing parameter never rejects the request.
#[derive(Debug, Default)]
pub struct UrlParams(Vec<(String, String)>);

impl UrlParams {
    pub fn get(&self, name: &str) -> &str {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }
}

impl From<Vec<(String, String)>> for UrlParams {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }
}

type StoreState = State<Arc<SessionStore>>;
type RawQuery = Query<Vec<(String, String)>>;

async fn run_blocking<T, F>(store: Arc<SessionStore>, op: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce(&SessionStore) -> T + Send + 'static,
{
    match tokio::task::spawn_blocking(move || op(&store)).await {
        Ok(value) => Some(value),
        Err(e) => {
            log::error!("Session store task failed: {}", e);
            None
        }
    }
}

fn error_body() -> Response {
    ERROR_SENTINEL.into_response()
}

/// `GET /create?user_id=..&current_hash=..`
pub async fn create(State(store): StoreState, Query(pairs): RawQuery) -> Response {
    let params = UrlParams::from(pairs);
    let user_id = params.get("user_id").to_string();
    let current_hash = params.get("current_hash").to_string();

    run_blocking(store, move |store| {
        store.create_session(&user_id, &current_hash).to_wire()
    })
    .await
    .map(IntoResponse::into_response)
    .unwrap_or_else(error_body)
}

/// `GET /subject?session_id=..` → current channel
pub async fn subject(State(store): StoreState, Query(pairs): RawQuery) -> Response {
    let session_id = UrlParams::from(pairs).get("session_id").to_string();

    match run_blocking(store, move |store| store.current_channel(&session_id)).await {
        Some(Ok(channel)) => channel.into_response(),
        Some(Err(e)) => {
            log::error!("Failed to read current channel: {}", e);
            error_body()
        }
        None => error_body(),
    }
}

/// `GET /select?session_id=..&channel=..`
pub async fn select(State(store): StoreState, Query(pairs): RawQuery) -> Response {
    let params = UrlParams::from(pairs);
    let session_id = params.get("session_id").to_string();
    let channel = params.get("channel").to_string();

    match run_blocking(store, move |store| {
        store.select_channel(&session_id, &channel)
    })
    .await
    {
        Some(Ok(true)) => OK_BODY.into_response(),
        Some(Ok(false)) => error_body(),
        Some(Err(e)) => {
            log::error!("Failed to update channel: {}", e);
            error_body()
        }
        None => error_body(),
    }
}

/// `GET /complete?session_id=..&channel=..` → order number of the entry
pub async fn complete(State(store): StoreState, Query(pairs): RawQuery) -> Response {
    let params = UrlParams::from(pairs);
    let session_id = params.get("session_id").to_string();
    let channel = params.get("channel").to_string();

    match run_blocking(store, move |store| {
        store.complete_channel(&session_id, &channel)
    })
    .await
    {
        Some(Ok(Some(order_num))) => order_num.to_string().into_response(),
        Some(Ok(None)) => error_body(),
        Some(Err(e)) => {
            log::error!("Failed to record completion: {}", e);
            error_body()
        }
        None => error_body(),
    }
}

/// `GET /completed?session_id=..` → JSON array of channels
pub async fn completed(State(store): StoreState, Query(pairs): RawQuery) -> Response {
    let session_id = UrlParams::from(pairs).get("session_id").to_string();

    match run_blocking(store, move |store| store.completed_channels(&session_id)).await {
        Some(Ok(channels)) => Json(channels).into_response(),
        Some(Err(e)) => {
            log::error!("Failed to list completions: {}", e);
            error_body()
        }
        None => error_body(),
    }
}

async fn mark(
    store: Arc<SessionStore>,
    pairs: Vec<(String, String)>,
    flag: SessionFlag,
) -> Response {
    let session_id = UrlParams::from(pairs).get("session_id").to_string();

    match run_blocking(store, move |store| store.mark_flag(&session_id, flag)).await {
        Some(Ok(true)) => OK_BODY.into_response(),
        Some(Ok(false)) => error_body(),
        Some(Err(e)) => {
            log::error!("Failed to set {}: {}", flag.column(), e);
            error_body()
        }
        None => error_body(),
    }
}

/// `GET /cannot_load?session_id=..`
pub async fn cannot_load(State(store): StoreState, Query(pairs): RawQuery) -> Response {
    mark(store, pairs, SessionFlag::CannotLoad).await
}

/// `GET /replay?session_id=..`
pub async fn replay(State(store): StoreState, Query(pairs): RawQuery) -> Response {
    mark(store, pairs, SessionFlag::Replay).await
}

/// `GET /comment?session_id=..`
pub async fn comment(State(store): StoreState, Query(pairs): RawQuery) -> Response {
    mark(store, pairs, SessionFlag::PlayComment).await
}
