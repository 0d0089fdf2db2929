//! Axum router construction for the relay server.
//!
//! Assembles the `WebSocket` route and the read-only HTTP routes into a
//! single [`Router`] with CORS middleware enabled, matching the
//! original service's allow-any-origin posture.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the relay server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /health` -- fixed OK response
/// - `GET /ws/chat` -- the `WebSocket` relay endpoint
/// - `GET /api/rooms` -- live room listing
///
/// CORS allows any origin; the relay carries no credentials and the
/// browser client is served from elsewhere.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        // WebSocket
        .route("/ws/chat", get(ws::ws_chat))
        // REST API
        .route("/api/rooms", get(handlers::list_rooms))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
