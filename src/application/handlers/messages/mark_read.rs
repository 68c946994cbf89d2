//! MarkReadHandler - advances a member's read cursor.
//!
//! The cursor only moves forward. Marking an older or equal message is a
//! successful no-op reported as `updated = false`.

use std::sync::Arc;

use crate::application::handlers::require_membership;
use crate::application::Fanout;
use crate::domain::chat::ChatError;
use crate::domain::foundation::{MessageId, RoomId, UserId};
use crate::ports::{MessageRepository, RoomRepository};

#[derive(Debug, Clone)]
pub struct MarkReadCommand {
    pub user_id: UserId,
    pub room_id: RoomId,
    pub last_read_message_id: MessageId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkReadResult {
    pub updated: bool,
}

pub struct MarkReadHandler {
    rooms: Arc<dyn RoomRepository>,
    messages: Arc<dyn MessageRepository>,
    fanout: Arc<Fanout>,
}

impl MarkReadHandler {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        messages: Arc<dyn MessageRepository>,
        fanout: Arc<Fanout>,
    ) -> Self {
        Self {
            rooms,
            messages,
            fanout,
        }
    }

    pub async fn handle(&self, cmd: MarkReadCommand) -> Result<MarkReadResult, ChatError> {
        let membership = require_membership(self.rooms.as_ref(), cmd.user_id, cmd.room_id).await?;

        let in_room = self
            .messages
            .find_by_id(cmd.last_read_message_id)
            .await?
            .map(|m| m.room_id() == cmd.room_id)
            .unwrap_or(false);
        if !in_room {
            return Err(ChatError::not_found("Message not found"));
        }

        if !membership.can_advance_to(cmd.last_read_message_id) {
            return Ok(MarkReadResult { updated: false });
        }

        let updated = self
            .rooms
            .advance_read_cursor(cmd.user_id, cmd.room_id, cmd.last_read_message_id)
            .await?;

        if updated {
            tracing::debug!(
                user_id = %cmd.user_id,
                room_id = %cmd.room_id,
                message_id = %cmd.last_read_message_id,
                "Read cursor advanced"
            );
            if let Some(connection_id) = membership.connection_id() {
                self.fanout.unread_for(cmd.user_id, connection_id).await;
            }
        }

        Ok(MarkReadResult { updated })
    }
}
