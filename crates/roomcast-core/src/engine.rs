//! The room membership and broadcast engine.
//!
//! [`RelayEngine`] owns the relay's only mutable state -- the connection
//! registry and the membership table -- behind a single mutex, and turns
//! inbound lifecycle and request events into outbound emissions through
//! an [`EventSink`].
//!
//! # Concurrency
//!
//! Different connections' events arrive concurrently, so every operation
//! runs as one short transaction under the engine lock: both membership
//! views mutate in the same critical section, and broadcast recipient
//! sets are snapshotted (and delivered to the sink) before the lock is
//! released. A join racing a leave therefore serializes, and no fan-out
//! ever observes a half-updated member list. Sink delivery is
//! non-blocking by contract, so holding the lock across emission does
//! not stall the engine on a slow connection.
//!
//! # Recipient scopes
//!
//! Confirmations (`connected`, `joined`, `left`, `participants_list`,
//! `test_response`) go to the acting connection only. Presence
//! notifications (`user_joined`, `user_left`) go to the room minus the
//! actor. Chat messages go to every member *including* the sender: the
//! sender sees its own message via the broadcast, never via local echo.

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use roomcast_types::{AckStatus, ChatMessage, ConnectionId, ServerEvent};

use crate::error::RelayError;
use crate::membership::MembershipTable;
use crate::registry::ConnectionRegistry;
use crate::sink::EventSink;

/// Counters describing the engine's current occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineStats {
    /// Live connections.
    pub connections: usize,
    /// Rooms with at least one member.
    pub rooms: usize,
}

/// One room's name and occupancy, for read-only listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    /// Canonical room name.
    pub name: String,
    /// Number of current members.
    pub members: usize,
}

/// Mutable engine state; one lock guards both members so the registry
/// and the membership table can never disagree about a connection.
#[derive(Debug, Default)]
struct EngineState {
    registry: ConnectionRegistry,
    table: MembershipTable,
}

/// The relay engine. One instance per server process, but nothing
/// prevents independent instances (tests create many).
#[derive(Debug)]
pub struct RelayEngine<S> {
    state: Mutex<EngineState>,
    sink: S,
}

impl<S: EventSink> RelayEngine<S> {
    /// Create an engine that emits through the given sink.
    pub fn new(sink: S) -> Self {
        Self {
            state: Mutex::new(EngineState::default()),
            sink,
        }
    }

    /// The transport-side sink this engine emits through.
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Handle a transport-level connect: register the connection and
    /// acknowledge it with a `connected` event.
    ///
    /// Idempotent: a duplicate connect for a live id is logged and
    /// ignored without re-acknowledging.
    pub async fn on_connect(&self, connection: ConnectionId) {
        let fresh = {
            let mut state = self.state.lock().await;
            state.registry.register(connection)
        };

        if fresh {
            info!(%connection, "client connected");
            self.sink.deliver(
                connection,
                &ServerEvent::Connected {
                    sid: connection,
                    message: String::from("Connected to server"),
                    status: AckStatus::Success,
                },
            );
        } else {
            warn!(%connection, "duplicate connect event ignored");
        }
    }

    /// Handle a transport-level disconnect: remove the connection from
    /// every room and notify each room's remaining members.
    ///
    /// No confirmation is sent to the disconnecting connection -- it is
    /// already gone. Idempotent: a second cascade for the same id finds
    /// nothing to do.
    pub async fn on_disconnect(&self, connection: ConnectionId) {
        let mut state = self.state.lock().await;
        let was_live = state.registry.unregister(connection);
        let outcomes = state.table.leave_all(connection);
        let timestamp = Utc::now();

        for outcome in &outcomes {
            let event = ServerEvent::UserLeft {
                room: outcome.room.clone(),
                sid: connection,
                timestamp,
                participants: outcome.remaining.iter().copied().collect(),
            };
            for member in &outcome.remaining {
                self.sink.deliver(*member, &event);
            }
        }
        drop(state);

        if was_live {
            info!(%connection, rooms = outcomes.len(), "client disconnected");
        }
    }

    /// Join a room, creating it implicitly on first membership.
    ///
    /// The caller always receives a `joined` confirmation with the
    /// current participant list; the rest of the room receives
    /// `user_joined` only when the membership is actually new.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidRoom`] for an empty or oversized
    /// room name. No state changes and nothing is emitted.
    pub async fn join(&self, connection: ConnectionId, room: &str) -> Result<(), RelayError> {
        let mut state = self.state.lock().await;
        let outcome = state.table.join(connection, room)?;
        let timestamp = Utc::now();
        let participants: Vec<ConnectionId> = outcome.participants.iter().copied().collect();

        self.sink.deliver(
            connection,
            &ServerEvent::Joined {
                room: outcome.room.clone(),
                sid: connection,
                timestamp,
                participants: participants.clone(),
                status: AckStatus::Success,
            },
        );

        if outcome.newly_joined {
            info!(%connection, room = %outcome.room, "client joined room");
            let notification = ServerEvent::UserJoined {
                room: outcome.room,
                sid: connection,
                timestamp,
                participants,
            };
            for member in outcome
                .participants
                .iter()
                .filter(|member| **member != connection)
            {
                self.sink.deliver(*member, &notification);
            }
        } else {
            debug!(%connection, room = %outcome.room, "rejoin confirmed without notification");
        }

        Ok(())
    }

    /// Leave a room, confirming to the caller and notifying the
    /// remaining members.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidRoom`] for a malformed name, or
    /// [`RelayError::NotMember`] if the connection never joined. No
    /// state changes and nothing is emitted on error.
    pub async fn leave(&self, connection: ConnectionId, room: &str) -> Result<(), RelayError> {
        let mut state = self.state.lock().await;
        let outcome = state.table.leave(connection, room)?;
        let timestamp = Utc::now();

        info!(%connection, room = %outcome.room, "client left room");
        self.sink.deliver(
            connection,
            &ServerEvent::Left {
                room: outcome.room.clone(),
                sid: connection,
                timestamp,
                status: AckStatus::Success,
            },
        );

        let notification = ServerEvent::UserLeft {
            room: outcome.room,
            sid: connection,
            timestamp,
            participants: outcome.remaining.iter().copied().collect(),
        };
        for member in &outcome.remaining {
            self.sink.deliver(*member, &notification);
        }

        Ok(())
    }

    /// Broadcast a chat message to every member of a room, including
    /// the sender.
    ///
    /// The sender id and timestamp are stamped here and are
    /// authoritative; the optional display name passes through
    /// verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::MissingRoom`] if the room name is blank,
    /// [`RelayError::EmptyMessage`] if the text trims to nothing, or
    /// [`RelayError::NotMember`] if the sender has not joined the room.
    /// Nothing is broadcast on error.
    pub async fn send_message(
        &self,
        sender: ConnectionId,
        room: &str,
        message: &str,
        username: Option<String>,
    ) -> Result<(), RelayError> {
        let room = room.trim();
        if room.is_empty() {
            return Err(RelayError::MissingRoom);
        }
        let text = message.trim();
        if text.is_empty() {
            return Err(RelayError::EmptyMessage);
        }

        let state = self.state.lock().await;
        // Membership is the broadcast gate, checked now rather than at
        // join time because it may have changed since.
        if !state.table.is_member(sender, room) {
            return Err(RelayError::NotMember {
                room: room.to_owned(),
            });
        }
        let recipients = state.table.members_of(room);

        let event = ServerEvent::Message(ChatMessage {
            room: room.to_owned(),
            message: text.to_owned(),
            sender,
            username,
            timestamp: Utc::now(),
        });
        for member in &recipients {
            self.sink.deliver(*member, &event);
        }
        drop(state);

        debug!(%sender, room, recipients = recipients.len(), "chat message broadcast");
        Ok(())
    }

    /// Answer a participant-list request to the requester only.
    ///
    /// An unknown room yields an empty list and a zero count -- asking
    /// about a room nobody is in is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::MissingRoom`] if the room name is blank.
    pub async fn get_participants(
        &self,
        connection: ConnectionId,
        room: &str,
    ) -> Result<(), RelayError> {
        let room = room.trim();
        if room.is_empty() {
            return Err(RelayError::MissingRoom);
        }

        let state = self.state.lock().await;
        let participants: Vec<ConnectionId> =
            state.table.members_of(room).iter().copied().collect();
        drop(state);

        self.sink.deliver(
            connection,
            &ServerEvent::ParticipantsList {
                room: room.to_owned(),
                count: participants.len(),
                participants,
                timestamp: Utc::now(),
            },
        );
        Ok(())
    }

    /// Echo a debug test message back to the caller.
    pub async fn test_message(&self, connection: ConnectionId, message: Option<String>) {
        debug!(%connection, "test message echoed");
        self.sink.deliver(
            connection,
            &ServerEvent::TestResponse {
                message: String::from("Test message received"),
                original_message: message,
                sid: connection,
                status: AckStatus::Success,
            },
        );
    }

    /// Current connection and room counts.
    pub async fn stats(&self) -> EngineStats {
        let state = self.state.lock().await;
        EngineStats {
            connections: state.registry.count(),
            rooms: state.table.room_count(),
        }
    }

    /// Snapshot of every live room and its occupancy, sorted by name.
    pub async fn room_summaries(&self) -> Vec<RoomSummary> {
        let state = self.state.lock().await;
        state
            .table
            .rooms()
            .map(|(name, members)| RoomSummary {
                name: name.clone(),
                members: members.len(),
            })
            .collect()
    }
}
