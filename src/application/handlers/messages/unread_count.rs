//! UnreadCountHandler - total unread messages across the caller's rooms.

use std::sync::Arc;

use crate::domain::chat::ChatError;
use crate::domain::foundation::UserId;
use crate::ports::MessageRepository;

#[derive(Debug, Clone, Default)]
pub struct UnreadCountQuery {
    /// Absent for anonymous callers, who always get zero.
    pub user_id: Option<UserId>,
}

pub struct UnreadCountHandler {
    messages: Arc<dyn MessageRepository>,
}

impl UnreadCountHandler {
    pub fn new(messages: Arc<dyn MessageRepository>) -> Self {
        Self { messages }
    }

    pub async fn handle(&self, query: UnreadCountQuery) -> Result<u64, ChatError> {
        match query.user_id {
            Some(user_id) => Ok(self.messages.unread_count(user_id).await?),
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryChatStore;
    use crate::domain::chat::{NewMessage, NewRoom};
    use crate::ports::RoomRepository;

    #[tokio::test]
    async fn anonymous_caller_gets_zero() {
        let handler = UnreadCountHandler::new(Arc::new(InMemoryChatStore::new()));
        assert_eq!(handler.handle(UnreadCountQuery::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn each_new_message_adds_one_across_rooms() {
        let store = Arc::new(InMemoryChatStore::new());
        let me = UserId::from_raw(1);
        let mut rooms = Vec::new();
        for other in [2, 3] {
            let (room, opening) = store
                .create_with_opening_message(
                    NewRoom::direct(me),
                    &[me, UserId::from_raw(other)],
                    UserId::from_raw(other),
                    "hi".into(),
                )
                .await
                .unwrap();
            store.advance_read_cursor(me, room.id(), opening.id()).await.unwrap();
            rooms.push(room);
        }
        let handler = UnreadCountHandler::new(store.clone());
        let query = UnreadCountQuery { user_id: Some(me) };
        assert_eq!(handler.handle(query.clone()).await.unwrap(), 0);

        store
            .append(NewMessage::text(rooms[0].id(), UserId::from_raw(2), "a").unwrap())
            .await
            .unwrap();
        assert_eq!(handler.handle(query.clone()).await.unwrap(), 1);

        store
            .append(NewMessage::text(rooms[1].id(), UserId::from_raw(3), "b").unwrap())
            .await
            .unwrap();
        assert_eq!(handler.handle(query).await.unwrap(), 2);
    }
}
