//! HTTP endpoint handlers for the relay server.
//!
//! Everything here is a read-only view over the engine; room state only
//! ever changes through `WebSocket` events.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/health` | Fixed OK response |
//! | `GET` | `/api/rooms` | List live rooms with member counts |

use std::sync::Arc;

use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::Json;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /health -- liveness probe
// ---------------------------------------------------------------------------

/// Fixed OK response for load balancers and container probes.
#[allow(clippy::unused_async)] // Axum handlers must be async
pub async fn health() -> &'static str {
    "ok"
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing current occupancy and the
/// endpoints a client can talk to.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let stats = state.engine.stats().await;
    let connections = stats.connections;
    let rooms = stats.rooms;

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Roomcast</title>
    <style>
        body {{ font-family: monospace; max-width: 640px; margin: 2rem auto; }}
        code {{ background: #eee; padding: 0 0.3rem; }}
    </style>
</head>
<body>
    <h1>Roomcast</h1>
    <p>Room-based message relay -- {connections} connection(s), {rooms} room(s)</p>
    <ul>
        <li><code>GET /health</code> -- liveness probe</li>
        <li><code>GET /api/rooms</code> -- live room listing</li>
        <li><code>ws://host:port/ws/chat</code> -- the relay itself</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /api/rooms -- list live rooms
// ---------------------------------------------------------------------------

/// List every room that currently has members, with its occupancy.
///
/// Rooms are ephemeral, so an empty listing just means nobody has
/// joined anything yet.
pub async fn list_rooms(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let summaries = state.engine.room_summaries().await;

    let rooms: Vec<serde_json::Value> = summaries
        .iter()
        .map(|summary| {
            serde_json::json!({
                "name": summary.name,
                "members": summary.members,
            })
        })
        .collect();

    Json(serde_json::json!({
        "count": rooms.len(),
        "rooms": rooms,
    }))
}
