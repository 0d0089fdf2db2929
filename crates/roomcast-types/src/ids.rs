//! Type-safe identifier for client connections.
//!
//! The transport layer assigns every accepted connection a [`ConnectionId`]
//! before the relay core ever sees it. The newtype prevents accidental
//! mixing with other UUID-valued data at compile time. IDs use UUID v7
//! (time-ordered) so log output sorts by connection age.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Unique identifier for a client connection.
///
/// Assigned by the transport at upgrade time and stamped by the server
/// onto every outbound event that names a connection (`sid` on the wire,
/// matching the original protocol's session-id field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ConnectionId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<ConnectionId> for Uuid {
    fn from(id: ConnectionId) -> Self {
        id.0
    }
}
