//! SendMessageHandler - persists a message, then fans it out.
//!
//! Membership is checked before the write, same as for reads. Nothing is
//! pushed unless the message was stored.

use std::sync::Arc;

use crate::application::handlers::require_membership;
use crate::application::Fanout;
use crate::domain::chat::{Attachments, ChatError, Message, MessageDisplay, NewMessage};
use crate::domain::foundation::{RoomId, UserId};
use crate::ports::{MessageRepository, RoomRepository};

#[derive(Debug, Clone)]
pub struct SendMessageCommand {
    pub room_id: RoomId,
    pub user_id: UserId,
    pub text: Option<String>,
    pub display: Vec<MessageDisplay>,
    pub attachments: Attachments,
}

impl SendMessageCommand {
    /// Plain text message with no display payload or attachments.
    pub fn text(room_id: RoomId, user_id: UserId, text: impl Into<String>) -> Self {
        Self {
            room_id,
            user_id,
            text: Some(text.into()),
            display: Vec::new(),
            attachments: Attachments::default(),
        }
    }
}

pub struct SendMessageHandler {
    rooms: Arc<dyn RoomRepository>,
    messages: Arc<dyn MessageRepository>,
    fanout: Arc<Fanout>,
}

impl SendMessageHandler {
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

    pub async fn handle(&self, cmd: SendMessageCommand) -> Result<Message, ChatError> {
        let new_message = NewMessage::new(
            cmd.room_id,
            cmd.user_id,
            cmd.text,
            cmd.display,
            cmd.attachments,
        )?;
        require_membership(self.rooms.as_ref(), cmd.user_id, cmd.room_id).await?;

        let message = self.messages.append(new_message).await?;
        tracing::debug!(
            room_id = %message.room_id(),
            message_id = %message.id(),
            user_id = %message.user_id(),
            "Message stored"
        );

        self.fanout.message_created(&message).await;
        Ok(message)
    }
}
