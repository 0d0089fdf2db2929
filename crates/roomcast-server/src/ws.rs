//! `WebSocket` handler for the chat relay.
//!
//! Clients connect to `GET /ws/chat`. Each accepted socket gets a fresh
//! [`ConnectionId`] and a private outbound queue, then the handler pumps
//! in both directions: engine emissions drain to the socket as JSON text
//! frames, inbound text frames dispatch to engine operations. When the
//! socket closes -- cleanly or not -- the disconnect cascade removes the
//! connection from every room and notifies the rooms it left.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use roomcast_types::ConnectionId;

use crate::dispatch;
use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and hand it to
/// the relay.
///
/// # Route
///
/// `GET /ws/chat`
pub async fn ws_chat(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Handle the `WebSocket` lifecycle: register the connection, pump
/// frames both ways, and run the disconnect cascade on the way out.
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let connection = ConnectionId::new();
    let (tx, mut rx) = mpsc::unbounded_channel();

    // The queue must exist before the engine emits the connected ack.
    state.engine.sink().register(connection, tx);
    state.engine.on_connect(connection).await;
    debug!(%connection, "WebSocket client connected");

    loop {
        tokio::select! {
            // Drain the engine's emissions for this connection.
            outbound = rx.recv() => {
                match outbound {
                    Some(event) => {
                        let json = match serde_json::to_string(&event) {
                            Ok(j) => j,
                            Err(e) => {
                                warn!(%connection, "failed to serialize outbound event: {e}");
                                continue;
                            }
                        };
                        if socket.send(Message::Text(json.into())).await.is_err() {
                            debug!(%connection, "WebSocket client disconnected (send failed)");
                            break;
                        }
                    }
                    None => break,
                }
            }
            // Receive the next client frame.
            frame = socket.recv() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        dispatch::handle_frame(&state.engine, connection, text.as_str()).await;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let pong = Message::Pong(data);
                        if socket.send(pong).await.is_err() {
                            debug!(%connection, "WebSocket client disconnected (pong failed)");
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(%connection, "WebSocket client disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        debug!(%connection, "WebSocket error: {e}");
                        break;
                    }
                    _ => {
                        // Ignore binary and pong frames.
                    }
                }
            }
        }
    }

    state.engine.on_disconnect(connection).await;
    state.engine.sink().unregister(connection);
}
