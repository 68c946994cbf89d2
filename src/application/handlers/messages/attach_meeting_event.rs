//! AttachMeetingEventHandler - records the calendar event created for a
//! picked meeting date on the message that offered it.

use std::sync::Arc;

use crate::domain::chat::{ChatError, Message};
use crate::domain::foundation::{EventId, MessageId};
use crate::ports::MessageRepository;

#[derive(Debug, Clone)]
pub struct AttachMeetingEventCommand {
    pub message_id: MessageId,
    pub event_id: EventId,
}

pub struct AttachMeetingEventHandler {
    messages: Arc<dyn MessageRepository>,
}

impl AttachMeetingEventHandler {
    pub fn new(messages: Arc<dyn MessageRepository>) -> Self {
        Self { messages }
    }

    /// Returns the enriched message, or `None` if the message is missing or
    /// has no display payload.
    pub async fn handle(&self, cmd: AttachMeetingEventCommand) -> Result<Option<Message>, ChatError> {
        let Some(mut message) = self.messages.find_by_id(cmd.message_id).await? else {
            tracing::debug!(message_id = %cmd.message_id, "Message not found for event");
            return Ok(None);
        };
        if !message.attach_event(cmd.event_id) {
            return Ok(None);
        }

        self.messages
            .update_display(message.id(), message.display())
            .await?;
        tracing::info!(
            message_id = %cmd.message_id,
            event_id = %cmd.event_id,
            "Meeting event attached"
        );
        Ok(Some(message))
    }
}
