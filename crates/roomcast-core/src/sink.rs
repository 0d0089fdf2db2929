//! Outbound delivery seam between the relay core and the transport.
//!
//! The core decides *who* receives *what*; the transport decides *how* a
//! frame reaches a socket. [`EventSink`] is the boundary: every outbound
//! emission is a fire-and-forget call that must not block, so a slow or
//! dead connection can never stall fan-out to the rest of a room.
//! Delivery to a connection that is already gone is silently dropped --
//! the disconnect cascade is responsible for cleanup, not the sender.

use std::sync::{Arc, Mutex, PoisonError};

use roomcast_types::{ConnectionId, ServerEvent};

/// Transport-side delivery of server events to a single connection.
///
/// Implementations must be non-blocking: the engine calls [`deliver`]
/// while holding its state lock so that broadcasts always reflect the
/// membership view they were computed from.
///
/// [`deliver`]: EventSink::deliver
pub trait EventSink: Send + Sync {
    /// Queue one event for one connection, best-effort.
    fn deliver(&self, to: ConnectionId, event: &ServerEvent);
}

/// In-memory sink that records every delivery, for tests.
///
/// Cloning shares the underlying record, so a test can keep a handle
/// while the engine owns the sink itself.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    deliveries: Arc<Mutex<Vec<(ConnectionId, ServerEvent)>>>,
}

impl RecordingSink {
    /// Create an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every delivery so far, in emission order.
    pub fn deliveries(&self) -> Vec<(ConnectionId, ServerEvent)> {
        self.lock().clone()
    }

    /// Events delivered to one specific connection, in emission order.
    pub fn delivered_to(&self, connection: ConnectionId) -> Vec<ServerEvent> {
        self.lock()
            .iter()
            .filter(|(to, _)| *to == connection)
            .map(|(_, event)| event.clone())
            .collect()
    }

    /// Clear the record.
    pub fn reset(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(ConnectionId, ServerEvent)>> {
        // A panicked test thread may poison the mutex; the record is
        // still valid for inspection.
        self.deliveries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl EventSink for RecordingSink {
    fn deliver(&self, to: ConnectionId, event: &ServerEvent) {
        self.lock().push((to, event.clone()));
    }
}
