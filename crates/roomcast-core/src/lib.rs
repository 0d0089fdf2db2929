//! Room membership and broadcast engine for the Roomcast relay.
//!
//! This crate is the part of the system with real state and concurrency
//! hazards: it tracks which connections are live, which rooms they
//! belong to, and fans chat messages and presence notifications out to
//! the right connection sets. Everything transport-shaped -- the
//! `WebSocket` upgrade, frame parsing, HTTP bootstrapping -- lives in
//! `roomcast-server` and talks to this crate through two narrow seams:
//! inbound, the engine's operation methods; outbound, the [`EventSink`]
//! trait.
//!
//! # Modules
//!
//! - [`engine`] -- the [`RelayEngine`]: one lock, all operations
//! - [`membership`] -- the bidirectional connection-room index
//! - [`registry`] -- live-connection tracking
//! - [`sink`] -- the outbound delivery seam and its test double
//! - [`error`] -- the per-request error taxonomy
//!
//! [`RelayEngine`]: engine::RelayEngine
//! [`EventSink`]: sink::EventSink

pub mod engine;
pub mod error;
pub mod membership;
pub mod registry;
pub mod sink;

// Re-export primary types for convenience.
pub use engine::{EngineStats, RelayEngine, RoomSummary};
pub use error::RelayError;
pub use membership::{JoinOutcome, LeaveOutcome, MembershipTable, MAX_ROOM_NAME_LEN};
pub use registry::ConnectionRegistry;
pub use sink::{EventSink, RecordingSink};
