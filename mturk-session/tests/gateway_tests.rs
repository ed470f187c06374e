/// Integration tests for the HTTP gateway
///
/// Requests go straight into the router with `oneshot`, no socket involved.

#[path = "testutils/mod.rs"]
mod testutils;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use mturk_session::{router, SessionStore, StorageType};
use regex::Regex;
use std::sync::Arc;
use testutils::{parse_wire, StoreFixture};
use tower::ServiceExt;

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn app_with_static() -> (Router, Arc<SessionStore>, tempfile::TempDir) {
    let static_dir = tempfile::tempdir().unwrap();
    std::fs::write(static_dir.path().join("index.html"), "<h1>experiment</h1>").unwrap();
    std::fs::create_dir(static_dir.path().join("js")).unwrap();
    std::fs::write(static_dir.path().join("js").join("task.js"), "let n = 1;").unwrap();

    let store = Arc::new(SessionStore::in_memory());
    (router(store.clone(), static_dir.path()), store, static_dir)
}

async fn create(app: &Router, user_id: &str) -> String {
    let (_, body) = get(app, &format!("/create?user_id={}&current_hash=h", user_id)).await;
    parse_wire(&body).expect("create should succeed").0
}

#[tokio::test]
async fn test_create_returns_session_then_error() {
    let (app, _store, _dir) = app_with_static();
    let pattern = Regex::new(r"^[0-9a-f]{32}&n=1$").unwrap();

    let (status, body) = get(&app, "/create?user_id=A1B2C3&current_hash=x").await;
    assert_eq!(status, StatusCode::OK);
    assert!(pattern.is_match(&body), "unexpected body '{}'", body);

    let (status, body) = get(&app, "/create?user_id=A1B2C3&current_hash=x").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "error");

    let (_, body) = get(&app, "/create?user_id=D4E5F6").await;
    assert_eq!(parse_wire(&body).unwrap().1, 3);
}

#[tokio::test]
async fn test_create_without_params_still_answers_ok() {
    let (app, store, _dir) = app_with_static();

    let (status, body) = get(&app, "/create").await;
    assert_eq!(status, StatusCode::OK);
    assert!(parse_wire(&body).is_some());

    // The empty identity is now taken
    let (status, body) = get(&app, "/create?user_id=").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "error");
    assert_eq!(store.user_count().unwrap(), 1);
}

#[tokio::test]
async fn test_duplicate_query_params_use_first_value() {
    let (app, store, _dir) = app_with_static();

    let session_id = create(&app, "first").await;
    let (_, body) = get(&app, "/create?user_id=second&user_id=first").await;
    assert!(parse_wire(&body).is_some());

    let record = store.lookup(&session_id).unwrap().unwrap();
    assert_eq!(record.user_id, "first");
    assert_eq!(store.user_count().unwrap(), 2);
}

#[tokio::test]
async fn test_select_and_subject() {
    let (app, _store, _dir) = app_with_static();
    let session_id = create(&app, "alice").await;

    let (_, body) = get(&app, &format!("/subject?session_id={}", session_id)).await;
    assert_eq!(body, "");

    let (status, body) = get(
        &app,
        &format!("/select?session_id={}&channel=sadness", session_id),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");

    let (_, body) = get(&app, &format!("/subject?session_id={}", session_id)).await;
    assert_eq!(body, "sadness");

    let (status, body) = get(&app, "/select?session_id=nope&channel=sadness").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "error");
}

#[tokio::test]
async fn test_complete_and_completed() {
    let (app, _store, _dir) = app_with_static();
    let session_id = create(&app, "alice").await;

    for (channel, expected) in [("joy", "1"), ("anger", "2"), ("joy", "1")] {
        let (status, body) = get(
            &app,
            &format!("/complete?session_id={}&channel={}", session_id, channel),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, expected, "completing {}", channel);
    }

    let (status, body) = get(&app, &format!("/completed?session_id={}", session_id)).await;
    assert_eq!(status, StatusCode::OK);
    let channels: Vec<String> = serde_json::from_str(&body).unwrap();
    assert_eq!(channels, vec!["joy", "anger"]);

    let (_, body) = get(&app, "/complete?session_id=nope&channel=joy").await;
    assert_eq!(body, "error");

    let (_, body) = get(&app, "/completed?session_id=nope").await;
    assert_eq!(body, "[]");
}

#[tokio::test]
async fn test_flag_routes() {
    let (app, store, _dir) = app_with_static();
    let session_id = create(&app, "alice").await;

    for route in ["cannot_load", "replay", "comment"] {
        let (status, body) = get(&app, &format!("/{}?session_id={}", route, session_id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok", "/{}", route);
    }

    let record = store.lookup(&session_id).unwrap().unwrap();
    assert_eq!(record.cannot_load, 1);
    assert_eq!(record.replay, 1);
    assert_eq!(record.play_comment, 1);

    let (_, body) = get(&app, "/replay?session_id=nope").await;
    assert_eq!(body, "error");
}

#[tokio::test]
async fn test_static_files_are_served() {
    let (app, _store, _dir) = app_with_static();

    let (status, body) = get(&app, "/index.html").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "<h1>experiment</h1>");

    let (status, body) = get(&app, "/js/task.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "let n = 1;");

    let (status, _) = get(&app, "/missing.png").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_gateway_over_persistent_driver() {
    let fixture = StoreFixture::new(StorageType::Sled).expect("Failed to create fixture");
    let static_dir = tempfile::tempdir().unwrap();
    let app = router(fixture.store.clone(), static_dir.path());

    let session_id = create(&app, "alice").await;
    let (_, body) = get(&app, "/create?user_id=alice").await;
    assert_eq!(body, "error");

    let record = fixture.store.lookup(&session_id).unwrap().unwrap();
    assert_eq!(record.current_hash, "h");
    assert_eq!(fixture.storage_type(), StorageType::Sled);
}
