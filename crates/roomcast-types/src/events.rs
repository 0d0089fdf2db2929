//! Wire-level event types for the relay protocol.
//!
//! Every frame exchanged over the `WebSocket` transport is a JSON object
//! with an `event` discriminator, mirroring the original protocol's
//! event-name + payload pairs. The enums here are internally tagged so
//! serde validates payload shape at the boundary; malformed frames never
//! reach the relay core as loose key-value data.
//!
//! Inbound and outbound directions are separate types: clients can only
//! request, the server can only notify. Connect and disconnect are
//! transport lifecycle transitions, not wire frames, so neither enum has
//! variants for them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::ConnectionId;

/// Acknowledgement status carried on success confirmations.
///
/// Failures never carry a status; they travel as [`ServerEvent::Error`]
/// instead, so the only value is `success`. Kept as an enum rather than
/// a bare string to keep the wire field typed end to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum AckStatus {
    /// The requested operation completed.
    Success,
}

/// A chat message as broadcast to room members.
///
/// Constructed server-side only: the sender id and timestamp are
/// authoritative and never taken from client input. The optional
/// `username` is a client-supplied display name passed through verbatim.
/// Messages are ephemeral; they exist only for the duration of the
/// broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChatMessage {
    /// The room the message was sent to.
    pub room: String,
    /// Message text, trimmed of surrounding whitespace.
    pub message: String,
    /// Connection id of the sender (server-stamped).
    pub sender: ConnectionId,
    /// Client-supplied display name, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Server-generated UTC timestamp (ISO-8601 on the wire).
    pub timestamp: DateTime<Utc>,
}

/// Events a client may send to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "event", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ClientEvent {
    /// Join a named room, creating it implicitly if this is the first
    /// member.
    Join {
        /// Name of the room to join.
        room: String,
    },

    /// Leave a room the connection previously joined.
    Leave {
        /// Name of the room to leave.
        room: String,
    },

    /// Request the current participant list of a room.
    GetParticipants {
        /// Name of the room to inspect.
        room: String,
    },

    /// Broadcast a chat message to a room's members.
    Message {
        /// Target room name.
        room: String,
        /// Message text.
        message: String,
        /// Optional display name shown to other members.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        username: Option<String>,
    },

    /// Debug echo used for connection verification.
    TestMessage {
        /// Arbitrary text to echo back.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

/// Events the server emits to clients.
///
/// Recipient scope varies per variant and is decided by the relay core:
/// confirmations go to the acting connection only, presence notifications
/// to the rest of the room, and chat messages to every member including
/// the sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "event", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ServerEvent {
    /// Connection acknowledgement, sent once after the upgrade.
    Connected {
        /// The id assigned to the new connection.
        sid: ConnectionId,
        /// Human-readable greeting.
        message: String,
        /// Always `success`.
        status: AckStatus,
    },

    /// Join confirmation, sent to the joining connection only.
    ///
    /// Re-emitted on rejoin with the unchanged participant list.
    Joined {
        /// The room that was joined.
        room: String,
        /// The joining connection.
        sid: ConnectionId,
        /// Server time of the join.
        timestamp: DateTime<Utc>,
        /// Full participant list including the new member.
        participants: Vec<ConnectionId>,
        /// Always `success`.
        status: AckStatus,
    },

    /// Presence notification to existing members when someone joins.
    ///
    /// Never sent to the joining connection itself, and never sent on
    /// rejoin.
    UserJoined {
        /// The room that gained a member.
        room: String,
        /// The connection that joined.
        sid: ConnectionId,
        /// Server time of the join.
        timestamp: DateTime<Utc>,
        /// Updated participant list.
        participants: Vec<ConnectionId>,
    },

    /// Leave confirmation, sent to the leaving connection only.
    ///
    /// Skipped when the leave is part of a disconnect cascade, since
    /// that connection is already gone.
    Left {
        /// The room that was left.
        room: String,
        /// The leaving connection.
        sid: ConnectionId,
        /// Server time of the leave.
        timestamp: DateTime<Utc>,
        /// Always `success`.
        status: AckStatus,
    },

    /// Presence notification to remaining members when someone leaves,
    /// whether explicitly or by disconnecting.
    UserLeft {
        /// The room that lost a member.
        room: String,
        /// The connection that left.
        sid: ConnectionId,
        /// Server time of the leave.
        timestamp: DateTime<Utc>,
        /// Updated participant list.
        participants: Vec<ConnectionId>,
    },

    /// Reply to a participant-list request, sent to the requester only.
    ParticipantsList {
        /// The inspected room.
        room: String,
        /// Current participants; empty for unknown rooms.
        participants: Vec<ConnectionId>,
        /// Number of participants.
        count: usize,
        /// Server time of the snapshot.
        timestamp: DateTime<Utc>,
    },

    /// A chat message, broadcast to every member of the room including
    /// the sender.
    Message(ChatMessage),

    /// Debug echo reply to a test message.
    TestResponse {
        /// Fixed acknowledgement text.
        message: String,
        /// The text the client sent, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        original_message: Option<String>,
        /// The requesting connection.
        sid: ConnectionId,
        /// Always `success`.
        status: AckStatus,
    },

    /// A per-request failure, reported to the originating connection
    /// only. The triggering operation left no partial state behind.
    Error {
        /// Human-readable description of what was rejected.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_event_join_wire_format() {
        let parsed: Result<ClientEvent, _> =
            serde_json::from_str(r#"{"event": "join", "room": "lobby"}"#);
        assert_eq!(
            parsed.ok(),
            Some(ClientEvent::Join {
                room: String::from("lobby")
            })
        );
    }

    #[test]
    fn client_event_message_username_optional() {
        let parsed: Result<ClientEvent, _> = serde_json::from_str(
            r#"{"event": "message", "room": "lobby", "message": "hi"}"#,
        );
        assert_eq!(
            parsed.ok(),
            Some(ClientEvent::Message {
                room: String::from("lobby"),
                message: String::from("hi"),
                username: None,
            })
        );
    }

    #[test]
    fn client_event_unknown_event_rejected() {
        let parsed: Result<ClientEvent, _> =
            serde_json::from_str(r#"{"event": "shutdown"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn client_event_missing_field_rejected() {
        // A join without a room is malformed at the serde boundary, not
        // a semantic error the core ever sees.
        let parsed: Result<ClientEvent, _> = serde_json::from_str(r#"{"event": "join"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn server_event_error_wire_format() {
        let event = ServerEvent::Error {
            message: String::from("Room name is required"),
        };
        let json = serde_json::to_value(&event).ok();
        assert_eq!(
            json,
            Some(serde_json::json!({
                "event": "error",
                "message": "Room name is required",
            }))
        );
    }

    #[test]
    fn server_event_message_flattens_chat_fields() {
        let sender = ConnectionId::new();
        let timestamp = Utc::now();
        let event = ServerEvent::Message(ChatMessage {
            room: String::from("lobby"),
            message: String::from("hi"),
            sender,
            username: Some(String::from("ada")),
            timestamp,
        });
        let json = serde_json::to_value(&event).unwrap_or_default();
        assert_eq!(json["event"], "message");
        assert_eq!(json["room"], "lobby");
        assert_eq!(json["message"], "hi");
        assert_eq!(json["username"], "ada");
        // RFC 3339 timestamps contain a 'T' date/time separator.
        assert!(json["timestamp"]
            .as_str()
            .is_some_and(|t| t.contains('T')));
    }

    #[test]
    fn ack_status_serializes_lowercase() {
        let json = serde_json::to_value(AckStatus::Success).ok();
        assert_eq!(json, Some(serde_json::json!("success")));
    }
}
