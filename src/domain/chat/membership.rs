//! Membership: one user in one room.
//!
//! Carries the member's read cursor and the live connection currently
//! representing them in the room, if any.
//!
//! # Invariants
//!
//! - `(user_id, room_id)` is unique
//! - `last_read_message_id` never moves backward once set
//! - at most one `connection_id` at a time; cleared on disconnect, never deleted

use crate::domain::foundation::{ConnectionId, MessageId, RoomId, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    user_id: UserId,
    room_id: RoomId,
    last_read_message_id: Option<MessageId>,
    connection_id: Option<ConnectionId>,
}

impl Membership {
    /// A fresh membership with nothing read and no live connection.
    pub fn new(user_id: UserId, room_id: RoomId) -> Self {
        Self {
            user_id,
            room_id,
            last_read_message_id: None,
            connection_id: None,
        }
    }

    /// Reconstitute a membership from persistence.
    pub fn reconstitute(
        user_id: UserId,
        room_id: RoomId,
        last_read_message_id: Option<MessageId>,
        connection_id: Option<ConnectionId>,
    ) -> Self {
        Self {
            user_id,
            room_id,
            last_read_message_id,
            connection_id,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    pub fn last_read_message_id(&self) -> Option<MessageId> {
        self.last_read_message_id
    }

    pub fn connection_id(&self) -> Option<&ConnectionId> {
        self.connection_id.as_ref()
    }

    pub fn is_live(&self) -> bool {
        self.connection_id.is_some()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Read cursor
    // ─────────────────────────────────────────────────────────────────────────

    /// True if moving the cursor to `candidate` would advance it.
    pub fn can_advance_to(&self, candidate: MessageId) -> bool {
        cursor_advances(self.last_read_message_id, candidate)
    }

    /// Moves the read cursor forward. Returns false (and changes nothing)
    /// when `candidate` is not strictly greater than the stored cursor.
    pub fn advance_read_cursor(&mut self, candidate: MessageId) -> bool {
        if !self.can_advance_to(candidate) {
            return false;
        }
        self.last_read_message_id = Some(candidate);
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Live connection
    // ─────────────────────────────────────────────────────────────────────────

    /// Points the membership at a new live connection, replacing any previous one.
    pub fn bind(&mut self, connection_id: ConnectionId) {
        self.connection_id = Some(connection_id);
    }

    /// Clears the live connection if it is `connection_id`. Returns true if cleared.
    pub fn unbind(&mut self, connection_id: &ConnectionId) -> bool {
        if self.connection_id.as_ref() == Some(connection_id) {
            self.connection_id = None;
            return true;
        }
        false
    }
}

/// Cursor rule shared with storage adapters that apply it in SQL.
pub fn cursor_advances(current: Option<MessageId>, candidate: MessageId) -> bool {
    match current {
        None => true,
        Some(current) => candidate > current,
    }
}
