//! Per-connection outbound channels -- the transport half of the Event
//! Dispatcher.
//!
//! Each `WebSocket` task registers an unbounded sender here at upgrade
//! time; the relay engine delivers through [`EventSink`] by looking the
//! recipient up and queueing the event. Queueing never blocks, so one
//! slow client cannot stall fan-out to the rest of a room -- its frames
//! just pile up in its own queue until its socket task drains them or
//! dies.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use tokio::sync::mpsc;
use tracing::debug;

use roomcast_core::EventSink;
use roomcast_types::{ConnectionId, ServerEvent};

/// Registry of outbound channels, keyed by connection id.
#[derive(Debug, Default)]
pub struct ConnectionChannels {
    channels: RwLock<BTreeMap<ConnectionId, mpsc::UnboundedSender<ServerEvent>>>,
}

impl ConnectionChannels {
    /// Create an empty channel registry.
    pub const fn new() -> Self {
        Self {
            channels: RwLock::new(BTreeMap::new()),
        }
    }

    /// Attach a connection's outbound queue. Must happen before the
    /// engine sees the connect event, or the `connected` ack is lost.
    pub fn register(&self, connection: ConnectionId, tx: mpsc::UnboundedSender<ServerEvent>) {
        self.write().insert(connection, tx);
    }

    /// Detach a connection's outbound queue after its socket closes.
    pub fn unregister(&self, connection: ConnectionId) {
        self.write().remove(&connection);
    }

    /// Number of attached connections.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether no connections are attached.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, BTreeMap<ConnectionId, mpsc::UnboundedSender<ServerEvent>>>
    {
        self.channels.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, BTreeMap<ConnectionId, mpsc::UnboundedSender<ServerEvent>>>
    {
        self.channels
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl EventSink for ConnectionChannels {
    fn deliver(&self, to: ConnectionId, event: &ServerEvent) {
        if let Some(tx) = self.read().get(&to) {
            // A closed receiver means the connection is mid-teardown;
            // the disconnect cascade will detach it shortly.
            if tx.send(event.clone()).is_err() {
                debug!(connection = %to, "dropped event for closing connection");
            }
        }
    }
}
