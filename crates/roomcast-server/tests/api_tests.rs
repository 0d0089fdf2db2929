//! Integration tests for the relay server's HTTP endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. Room state is driven through the engine the
//! same way the `WebSocket` layer drives it.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use roomcast_server::{build_router, AppState};
use roomcast_types::ConnectionId;
use serde_json::Value;
use tower::ServiceExt;

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_health_returns_ok() {
    let state = Arc::new(AppState::new());
    let router = build_router(state);

    let response = router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn test_index_returns_html() {
    let state = Arc::new(AppState::new());
    let router = build_router(state);

    let response = router
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.contains("text/html"));
}

#[tokio::test]
async fn test_list_rooms_empty() {
    let state = Arc::new(AppState::new());
    let router = build_router(state);

    let response = router
        .oneshot(Request::get("/api/rooms").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 0);
    assert!(json["rooms"].as_array().is_some_and(Vec::is_empty));
}

#[tokio::test]
async fn test_list_rooms_reflects_membership() {
    let state = Arc::new(AppState::new());

    let (c1, c2) = (ConnectionId::new(), ConnectionId::new());
    state.engine.join(c1, "lobby").await.unwrap();
    state.engine.join(c2, "lobby").await.unwrap();
    state.engine.join(c2, "standup").await.unwrap();

    let router = build_router(Arc::clone(&state));
    let response = router
        .oneshot(Request::get("/api/rooms").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 2);
    // Room listings are sorted by name.
    assert_eq!(json["rooms"][0]["name"], "lobby");
    assert_eq!(json["rooms"][0]["members"], 2);
    assert_eq!(json["rooms"][1]["name"], "standup");
    assert_eq!(json["rooms"][1]["members"], 1);
}

#[tokio::test]
async fn test_list_rooms_after_reap() {
    let state = Arc::new(AppState::new());

    let c1 = ConnectionId::new();
    state.engine.join(c1, "lobby").await.unwrap();
    state.engine.on_disconnect(c1).await;

    let router = build_router(Arc::clone(&state));
    let response = router
        .oneshot(Request::get("/api/rooms").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 0, "emptied rooms must not appear");
}

#[tokio::test]
async fn test_ws_route_rejects_plain_get() {
    let state = Arc::new(AppState::new());
    let router = build_router(state);

    // Without upgrade headers the WebSocket route must refuse politely,
    // not panic.
    let response = router
        .oneshot(Request::get("/ws/chat").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_nonexistent_route_returns_404() {
    let state = Arc::new(AppState::new());
    let router = build_router(state);

    let response = router
        .oneshot(Request::get("/api/nonexistent").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
