//! Bidirectional connection-room membership index.
//!
//! [`MembershipTable`] is the central shared state of the relay. It keeps
//! two mirrored views so both lookup directions are cheap:
//!
//! - room name -> set of member connections
//! - connection -> set of rooms it belongs to
//!
//! The two views are kept mutually consistent by updating both inside
//! every mutating operation, and entries are reaped the moment they
//! become empty: a room exists iff it has at least one member, and a
//! connection appears in the reverse index iff it is in at least one
//! room. Callers that need these updates to be atomic across threads
//! wrap the table in a lock; the table itself is a plain data structure
//! (the engine owns exactly one, behind its mutex).

use std::collections::{BTreeMap, BTreeSet};

use roomcast_types::ConnectionId;

use crate::error::RelayError;

/// Maximum length of a room name, in characters, after trimming.
pub const MAX_ROOM_NAME_LEN: usize = 100;

/// Validate a raw room name and return its canonical (trimmed) form.
fn normalize_room_name(raw: &str) -> Result<&str, RelayError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RelayError::InvalidRoom {
            reason: String::from("must not be empty"),
        });
    }
    if trimmed.chars().count() > MAX_ROOM_NAME_LEN {
        return Err(RelayError::InvalidRoom {
            reason: format!("must be at most {MAX_ROOM_NAME_LEN} characters"),
        });
    }
    Ok(trimmed)
}

/// Result of a successful [`MembershipTable::join`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    /// Canonical (trimmed) room name.
    pub room: String,
    /// Participant set including the joining connection.
    pub participants: BTreeSet<ConnectionId>,
    /// Whether this join created a new membership. `false` means the
    /// connection was already in the room and nothing changed.
    pub newly_joined: bool,
}

/// Result of a successful [`MembershipTable::leave`], and one element of
/// a [`MembershipTable::leave_all`] cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveOutcome {
    /// Canonical (trimmed) room name.
    pub room: String,
    /// Participants remaining after the removal. Empty when the room
    /// was reaped.
    pub remaining: BTreeSet<ConnectionId>,
}

/// The bidirectional connection-room index.
#[derive(Debug, Default)]
pub struct MembershipTable {
    /// Room name -> member connections.
    rooms: BTreeMap<String, BTreeSet<ConnectionId>>,
    /// Connection -> rooms it belongs to (reverse index).
    memberships: BTreeMap<ConnectionId, BTreeSet<String>>,
}

impl MembershipTable {
    /// Create an empty table.
    pub const fn new() -> Self {
        Self {
            rooms: BTreeMap::new(),
            memberships: BTreeMap::new(),
        }
    }

    /// Add a connection to a room, creating the room on first join.
    ///
    /// Idempotent: joining a room the connection is already in changes
    /// nothing and reports `newly_joined: false`, so the caller can
    /// re-confirm to the client without re-notifying the room.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidRoom`] if the name is empty or
    /// longer than [`MAX_ROOM_NAME_LEN`] characters after trimming.
    pub fn join(
        &mut self,
        connection: ConnectionId,
        raw_room: &str,
    ) -> Result<JoinOutcome, RelayError> {
        let room = normalize_room_name(raw_room)?;

        let members = self.rooms.entry(room.to_owned()).or_default();
        let newly_joined = members.insert(connection);
        let participants = members.clone();

        if newly_joined {
            self.memberships
                .entry(connection)
                .or_default()
                .insert(room.to_owned());
        }

        Ok(JoinOutcome {
            room: room.to_owned(),
            participants,
            newly_joined,
        })
    }

    /// Remove a connection from a room, reaping the room if it empties.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidRoom`] for a malformed name and
    /// [`RelayError::NotMember`] if the connection is not currently in
    /// the room.
    pub fn leave(
        &mut self,
        connection: ConnectionId,
        raw_room: &str,
    ) -> Result<LeaveOutcome, RelayError> {
        let room = normalize_room_name(raw_room)?;

        let not_member = || RelayError::NotMember {
            room: room.to_owned(),
        };
        let members = self.rooms.get_mut(room).ok_or_else(not_member)?;
        if !members.remove(&connection) {
            return Err(not_member());
        }

        let remaining = members.clone();
        if members.is_empty() {
            self.rooms.remove(room);
        }
        self.drop_reverse_entry(connection, room);

        Ok(LeaveOutcome {
            room: room.to_owned(),
            remaining,
        })
    }

    /// Remove a connection from every room it belongs to.
    ///
    /// Used by the disconnect cascade. Safe to call for a connection
    /// with no memberships: returns an empty list, not an error, which
    /// also makes a racing explicit leave / disconnect pair harmless.
    pub fn leave_all(&mut self, connection: ConnectionId) -> Vec<LeaveOutcome> {
        let Some(joined_rooms) = self.memberships.remove(&connection) else {
            return Vec::new();
        };

        let mut outcomes = Vec::with_capacity(joined_rooms.len());
        for room in joined_rooms {
            if let Some(members) = self.rooms.get_mut(&room) {
                members.remove(&connection);
                let remaining = members.clone();
                if members.is_empty() {
                    self.rooms.remove(&room);
                }
                outcomes.push(LeaveOutcome { room, remaining });
            }
        }
        outcomes
    }

    /// Current members of a room. Unknown rooms yield an empty set,
    /// never an error.
    pub fn members_of(&self, room: &str) -> BTreeSet<ConnectionId> {
        self.rooms.get(room).cloned().unwrap_or_default()
    }

    /// Whether a connection is currently a member of a room.
    ///
    /// This is the broadcast gate: checked at message time, not join
    /// time.
    pub fn is_member(&self, connection: ConnectionId, room: &str) -> bool {
        self.rooms
            .get(room)
            .is_some_and(|members| members.contains(&connection))
    }

    /// Number of rooms that currently have members.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Iterate over rooms and their member sets.
    pub fn rooms(&self) -> impl Iterator<Item = (&String, &BTreeSet<ConnectionId>)> {
        self.rooms.iter()
    }

    /// Remove a room from a connection's reverse-index entry, reaping
    /// the entry if it empties.
    fn drop_reverse_entry(&mut self, connection: ConnectionId, room: &str) {
        if let Some(joined) = self.memberships.get_mut(&connection) {
            joined.remove(room);
            if joined.is_empty() {
                self.memberships.remove(&connection);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> ConnectionId {
        ConnectionId::new()
    }

    /// Check the structural invariants: the two views mirror each other
    /// exactly, and no empty entry lingers in either.
    fn assert_consistent(table: &MembershipTable) {
        for (room, members) in &table.rooms {
            assert!(!members.is_empty(), "empty room entry lingers: {room}");
            for member in members {
                let reverse = table.memberships.get(member);
                assert!(
                    reverse.is_some_and(|rooms| rooms.contains(room)),
                    "room view lists {member} in {room} but reverse view disagrees"
                );
            }
        }
        for (connection, joined) in &table.memberships {
            assert!(
                !joined.is_empty(),
                "empty reverse-index entry lingers: {connection}"
            );
            for room in joined {
                let members = table.rooms.get(room);
                assert!(
                    members.is_some_and(|m| m.contains(connection)),
                    "reverse view lists {connection} in {room} but room view disagrees"
                );
            }
        }
    }

    #[test]
    fn join_creates_room_and_mirrors_views() {
        let mut table = MembershipTable::new();
        let c1 = conn();

        let outcome = table.join(c1, "lobby");
        assert_eq!(outcome.map(|o| o.newly_joined), Ok(true));
        assert!(table.is_member(c1, "lobby"));
        assert_consistent(&table);
    }

    #[test]
    fn join_trims_room_name() {
        let mut table = MembershipTable::new();
        let c1 = conn();

        let outcome = table.join(c1, "  lobby  ");
        assert_eq!(outcome.map(|o| o.room), Ok(String::from("lobby")));
        assert!(table.is_member(c1, "lobby"));
    }

    #[test]
    fn join_rejects_empty_and_oversized_names() {
        let mut table = MembershipTable::new();
        let c1 = conn();

        assert!(matches!(
            table.join(c1, "   "),
            Err(RelayError::InvalidRoom { .. })
        ));

        let oversized = "r".repeat(MAX_ROOM_NAME_LEN.saturating_add(1));
        assert!(matches!(
            table.join(c1, &oversized),
            Err(RelayError::InvalidRoom { .. })
        ));

        // Exactly at the limit is accepted.
        let at_limit = "r".repeat(MAX_ROOM_NAME_LEN);
        assert!(table.join(c1, &at_limit).is_ok());
        assert_consistent(&table);
    }

    #[test]
    fn rejoin_is_idempotent() {
        let mut table = MembershipTable::new();
        let c1 = conn();

        let first = table.join(c1, "lobby");
        let second = table.join(c1, "lobby");

        assert_eq!(first.map(|o| o.newly_joined), Ok(true));
        assert_eq!(
            second.map(|o| (o.newly_joined, o.participants.len())),
            Ok((false, 1)),
            "rejoin must not duplicate membership"
        );
        assert_consistent(&table);
    }

    #[test]
    fn leave_returns_remaining_and_reaps_empty_room() {
        let mut table = MembershipTable::new();
        let (c1, c2) = (conn(), conn());

        let _ = table.join(c1, "lobby");
        let _ = table.join(c2, "lobby");

        let outcome = table.leave(c1, "lobby");
        assert_eq!(
            outcome.map(|o| o.remaining.into_iter().collect::<Vec<_>>()),
            Ok(vec![c2])
        );
        assert_consistent(&table);

        let last = table.leave(c2, "lobby");
        assert_eq!(last.map(|o| o.remaining.len()), Ok(0));
        assert_eq!(table.room_count(), 0, "empty room must be reaped");
        assert_consistent(&table);
    }

    #[test]
    fn leave_without_membership_is_an_error_and_no_op() {
        let mut table = MembershipTable::new();
        let (c1, c2) = (conn(), conn());

        let _ = table.join(c1, "lobby");

        assert!(matches!(
            table.leave(c2, "lobby"),
            Err(RelayError::NotMember { .. })
        ));
        assert!(matches!(
            table.leave(c1, "elsewhere"),
            Err(RelayError::NotMember { .. })
        ));
        assert!(table.is_member(c1, "lobby"), "failed leave must not mutate");
        assert_consistent(&table);
    }

    #[test]
    fn leave_all_removes_every_membership() {
        let mut table = MembershipTable::new();
        let (c1, c2) = (conn(), conn());

        let _ = table.join(c1, "alpha");
        let _ = table.join(c1, "beta");
        let _ = table.join(c2, "beta");

        let mut outcomes = table.leave_all(c1);
        outcomes.sort_by(|a, b| a.room.cmp(&b.room));

        let rooms: Vec<&str> = outcomes.iter().map(|o| o.room.as_str()).collect();
        assert_eq!(rooms, vec!["alpha", "beta"]);
        assert!(!table.is_member(c1, "alpha"));
        assert!(!table.is_member(c1, "beta"));
        assert!(table.is_member(c2, "beta"));
        assert_eq!(table.room_count(), 1, "alpha must be reaped, beta kept");
        assert_consistent(&table);
    }

    #[test]
    fn leave_all_on_unknown_connection_is_empty() {
        let mut table = MembershipTable::new();
        assert!(table.leave_all(conn()).is_empty());
        assert_consistent(&table);
    }

    #[test]
    fn members_of_unknown_room_is_empty_not_error() {
        let table = MembershipTable::new();
        assert!(table.members_of("ghost").is_empty());
    }

    #[test]
    fn invariants_hold_across_interleaved_operations() {
        let mut table = MembershipTable::new();
        let connections: Vec<ConnectionId> = (0..4).map(|_| conn()).collect();
        let rooms = ["alpha", "beta", "gamma"];

        // A fixed interleaving of joins, leaves, rejoins and cascades;
        // the invariants must hold after every step.
        for (step, connection) in connections.iter().copied().enumerate() {
            for room in rooms {
                let _ = table.join(connection, room);
                assert_consistent(&table);
            }
            if step.is_multiple_of(2) {
                let _ = table.leave(connection, "beta");
                assert_consistent(&table);
            }
        }
        for connection in connections.iter().copied() {
            let _ = table.leave_all(connection);
            assert_consistent(&table);
        }
        assert_eq!(table.room_count(), 0);
    }
}
