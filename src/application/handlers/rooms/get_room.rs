//! GetRoomHandler - a single room, visible to members only.

use std::sync::Arc;

use crate::application::handlers::require_membership;
use crate::domain::chat::{ChatError, Room};
use crate::domain::foundation::{RoomId, UserId};
use crate::ports::RoomRepository;

#[derive(Debug, Clone)]
pub struct GetRoomQuery {
    pub room_id: RoomId,
    pub user_id: UserId,
}

pub struct GetRoomHandler {
    rooms: Arc<dyn RoomRepository>,
}

impl GetRoomHandler {
    pub fn new(rooms: Arc<dyn RoomRepository>) -> Self {
        Self { rooms }
    }

    pub async fn handle(&self, query: GetRoomQuery) -> Result<Room, ChatError> {
        require_membership(self.rooms.as_ref(), query.user_id, query.room_id).await?;
        self.rooms
            .find_by_id(query.room_id)
            .await?
            .ok_or_else(ChatError::room_not_found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryChatStore;
    use crate::domain::chat::NewRoom;

    #[tokio::test]
    async fn members_see_room_others_get_not_found() {
        let store = Arc::new(InMemoryChatStore::new());
        let host = UserId::from_raw(1);
        let (room, _) = store
            .create_with_opening_message(
                NewRoom::direct(host),
                &[host, UserId::from_raw(2)],
                host,
                "hi".into(),
            )
            .await
            .unwrap();
        let handler = GetRoomHandler::new(store);

        let seen = handler
            .handle(GetRoomQuery {
                room_id: room.id(),
                user_id: host,
            })
            .await
            .unwrap();
        assert_eq!(seen.id(), room.id());

        let hidden = handler
            .handle(GetRoomQuery {
                room_id: room.id(),
                user_id: UserId::from_raw(3),
            })
            .await;
        assert!(matches!(hidden, Err(ChatError::NotFound(_))));

        let missing = handler
            .handle(GetRoomQuery {
                room_id: RoomId::from_raw(999),
                user_id: host,
            })
            .await;
        assert_eq!(missing.unwrap_err(), ChatError::room_not_found());
    }
}
