//! Live-connection tracking.
//!
//! The transport assigns connection ids before the core sees them; the
//! registry only acknowledges lifecycle transitions. Both directions are
//! idempotent so a duplicate connect or a disconnect racing an in-flight
//! teardown degrades to a no-op instead of an error.

use std::collections::BTreeSet;

use roomcast_types::ConnectionId;

/// The set of connections the transport currently holds open.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    live: BTreeSet<ConnectionId>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            live: BTreeSet::new(),
        }
    }

    /// Record a new live connection.
    ///
    /// Returns `false` if the id was already registered, in which case
    /// nothing changed.
    pub fn register(&mut self, connection: ConnectionId) -> bool {
        self.live.insert(connection)
    }

    /// Remove a connection from the live set.
    ///
    /// Returns `false` if the id was not registered.
    pub fn unregister(&mut self, connection: ConnectionId) -> bool {
        self.live.remove(&connection)
    }

    /// Whether a connection is currently live.
    pub fn is_live(&self, connection: ConnectionId) -> bool {
        self.live.contains(&connection)
    }

    /// Number of live connections.
    pub fn count(&self) -> usize {
        self.live.len()
    }
}
