//! HTTP + `WebSocket` transport server for the Roomcast relay.
//!
//! This crate is the surrounding collaborator around `roomcast-core`: it
//! owns the sockets, parses frames into typed events, and feeds them to
//! the engine, which decides what goes back out and to whom.
//!
//! - **`WebSocket` endpoint** (`/ws/chat`) -- the relay itself: join and
//!   leave rooms, broadcast messages, receive presence notifications
//! - **Health endpoint** (`GET /health`) -- fixed OK response
//! - **Room listing** (`GET /api/rooms`) -- read-only occupancy view
//! - **Minimal HTML status page** (`GET /`)
//!
//! # Architecture
//!
//! Each accepted socket runs one task that pumps in both directions: a
//! private unbounded queue drains engine emissions to the socket, and
//! inbound frames dispatch to engine operations. All room state lives
//! in the engine; the server holds only the per-connection channels.

pub mod config;
pub mod connections;
pub(crate) mod dispatch;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{start_server, ServerConfig, ServerError};
pub use state::AppState;
