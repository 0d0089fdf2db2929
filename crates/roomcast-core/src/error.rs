//! Error types for the relay core.
//!
//! Every variant of [`RelayError`] is a local, recoverable, per-request
//! failure: it never terminates the connection, never affects other
//! connections, and leaves no partial state behind. The dispatch layer
//! maps each variant to a single outbound `error` event whose text is
//! this type's [`Display`](core::fmt::Display) output.

/// Errors that can occur while handling a client request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    /// The room name is malformed (empty or oversized after trimming).
    #[error("invalid room name: {reason}")]
    InvalidRoom {
        /// What the name violated.
        reason: String,
    },

    /// The request requires a room name and none was given.
    #[error("room name is required")]
    MissingRoom,

    /// The connection is not currently a member of the named room.
    ///
    /// Checked at operation time, not just join time, since membership
    /// can change between a client's join and its next request.
    #[error("not a member of room: {room}")]
    NotMember {
        /// The room the connection is not in.
        room: String,
    },

    /// The message text is empty after trimming.
    #[error("message text is required")]
    EmptyMessage,

    /// The payload could not be parsed into a known request shape.
    #[error("invalid message format")]
    InvalidFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_client_presentable() {
        // These strings travel to clients verbatim inside `error` events,
        // so they must stay human-readable and free of internal detail.
        assert_eq!(RelayError::MissingRoom.to_string(), "room name is required");
        assert_eq!(
            RelayError::NotMember {
                room: String::from("lobby")
            }
            .to_string(),
            "not a member of room: lobby"
        );
        assert_eq!(
            RelayError::InvalidRoom {
                reason: String::from("must not be empty")
            }
            .to_string(),
            "invalid room name: must not be empty"
        );
    }
}
