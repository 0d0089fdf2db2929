//! Shared application state for the relay server.
//!
//! [`AppState`] owns the one [`RelayEngine`] instance, wired to the
//! transport's [`ConnectionChannels`] sink. It is wrapped in an
//! [`Arc`](std::sync::Arc) and injected into handlers via Axum's
//! `State` extractor.

use roomcast_core::RelayEngine;

use crate::connections::ConnectionChannels;

/// Shared state for the Axum application.
#[derive(Debug)]
pub struct AppState {
    /// The room membership and broadcast engine.
    pub engine: RelayEngine<ConnectionChannels>,
}

impl AppState {
    /// Create a fresh state: empty engine, no connections.
    pub fn new() -> Self {
        Self {
            engine: RelayEngine::new(ConnectionChannels::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
