//! Notifications pushed to live connections by the application layer.
//!
//! These are fire-and-forget: a push that cannot be delivered is a soft
//! miss. Request/response replies (history, acks, errors) are produced by the
//! gateway itself and are not modelled here.

use crate::domain::foundation::{MessageId, RoomId, Timestamp, UserId};
use serde::{Deserialize, Serialize};

use super::{Message, MessageDisplay};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatNotification {
    /// The connection's user was placed in a newly formed room.
    RoomAssigned { room_id: RoomId },

    /// A message was persisted in a room the connection's user belongs to.
    NewMessage {
        room_id: RoomId,
        message_id: MessageId,
        user_id: UserId,
        text: Option<String>,
        display: Vec<MessageDisplay>,
        created_at: Timestamp,
    },

    /// The connection's user's total unread count changed.
    UnreadCount { count: u64 },
}

impl ChatNotification {
    pub fn new_message(message: &Message) -> Self {
        ChatNotification::NewMessage {
            room_id: message.room_id(),
            message_id: message.id(),
            user_id: message.user_id(),
            text: message.text().map(String::from),
            display: message.display().to_vec(),
            created_at: *message.created_at(),
        }
    }

    /// Event name, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            ChatNotification::RoomAssigned { .. } => "roomAssigned",
            ChatNotification::NewMessage { .. } => "newMessage",
            ChatNotification::UnreadCount { .. } => "unreadCount",
        }
    }
}
