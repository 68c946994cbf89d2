//! RoomHistoryHandler - the whole conversation of a room, members only.

use std::sync::Arc;

use crate::application::handlers::require_membership;
use crate::domain::chat::{ChatError, Message};
use crate::domain::foundation::{RoomId, UserId};
use crate::ports::{MessageRepository, RoomRepository};

#[derive(Debug, Clone)]
pub struct RoomHistoryQuery {
    pub room_id: RoomId,
    pub user_id: UserId,
}

pub struct RoomHistoryHandler {
    rooms: Arc<dyn RoomRepository>,
    messages: Arc<dyn MessageRepository>,
}

impl RoomHistoryHandler {
    pub fn new(rooms: Arc<dyn RoomRepository>, messages: Arc<dyn MessageRepository>) -> Self {
        Self { rooms, messages }
    }

    pub async fn handle(&self, query: RoomHistoryQuery) -> Result<Vec<Message>, ChatError> {
        require_membership(self.rooms.as_ref(), query.user_id, query.room_id).await?;
        Ok(self.messages.history(query.room_id).await?)
    }
}
