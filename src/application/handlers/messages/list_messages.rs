//! ListMessagesHandler - paginated messages of one room, members only.

use std::sync::Arc;

use crate::application::handlers::require_membership;
use crate::application::ChatPolicy;
use crate::domain::chat::{ChatError, Message, Room};
use crate::domain::foundation::{Page, RoomId, SortDirection, UserId};
use crate::ports::{MessageQuery, MessageRepository, RoomRepository};

#[derive(Debug, Clone)]
pub struct ListMessagesQuery {
    pub room_id: RoomId,
    pub user_id: UserId,
    pub author_id: Option<UserId>,
    pub text: Option<String>,
    pub direction: SortDirection,
    pub include_meta: bool,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ListMessagesQuery {
    pub fn new(room_id: RoomId, user_id: UserId) -> Self {
        Self {
            room_id,
            user_id,
            author_id: None,
            text: None,
            direction: SortDirection::Asc,
            include_meta: false,
            page: None,
            page_size: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListMessagesResult {
    pub messages: Page<Message>,
    /// The room itself, when `include_meta` was requested.
    pub room: Option<Room>,
}

pub struct ListMessagesHandler {
    rooms: Arc<dyn RoomRepository>,
    messages: Arc<dyn MessageRepository>,
    policy: ChatPolicy,
}

impl ListMessagesHandler {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        messages: Arc<dyn MessageRepository>,
        policy: ChatPolicy,
    ) -> Self {
        Self {
            rooms,
            messages,
            policy,
        }
    }

    pub async fn handle(&self, query: ListMessagesQuery) -> Result<ListMessagesResult, ChatError> {
        let page = self.policy.page(query.page, query.page_size)?;
        require_membership(self.rooms.as_ref(), query.user_id, query.room_id).await?;

        let message_query = MessageQuery {
            author_id: query.author_id,
            text: query.text.filter(|t| !t.trim().is_empty()),
            direction: query.direction,
        };
        let messages = self
            .messages
            .list_for_room(query.room_id, &message_query, page)
            .await?;

        let room = if query.include_meta {
            self.rooms.find_by_id(query.room_id).await?
        } else {
            None
        };

        Ok(ListMessagesResult { messages, room })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryChatStore;
    use crate::domain::chat::{NewMessage, NewRoom};

    async fn seeded() -> (Arc<InMemoryChatStore>, Room) {
        let store = Arc::new(InMemoryChatStore::new());
        let a = UserId::from_raw(1);
        let b = UserId::from_raw(2);
        let (room, _) = store
            .create_with_opening_message(NewRoom::direct(a), &[a, b], a, "Welcome aboard".into())
            .await
            .unwrap();
        for (author, text) in [(b, "Thanks, offer received"), (a, "Offer expires Friday"), (b, "ok")] {
            store
                .append(NewMessage::text(room.id(), author, text).unwrap())
                .await
                .unwrap();
        }
        (store, room)
    }

    fn handler(store: &Arc<InMemoryChatStore>) -> ListMessagesHandler {
        ListMessagesHandler::new(store.clone(), store.clone(), ChatPolicy::default())
    }

    #[tokio::test]
    async fn member_pages_through_in_creation_order() {
        let (store, room) = seeded().await;
        let mut q = ListMessagesQuery::new(room.id(), UserId::from_raw(2));
        q.page_size = Some(3);

        let result = handler(&store).handle(q).await.unwrap();

        assert_eq!(result.messages.total, 4);
        assert!(result.messages.has_more);
        let texts: Vec<_> = result.messages.items.iter().filter_map(|m| m.text()).collect();
        assert_eq!(texts, vec!["Welcome aboard", "Thanks, offer received", "Offer expires Friday"]);
        assert!(result.room.is_none());
    }

    #[tokio::test]
    async fn non_member_gets_not_found() {
        let (store, room) = seeded().await;
        let err = handler(&store)
            .handle(ListMessagesQuery::new(room.id(), UserId::from_raw(3)))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::NotFound(_)));
    }

    #[tokio::test]
    async fn filters_by_author_and_text() {
        let (store, room) = seeded().await;
        let mut q = ListMessagesQuery::new(room.id(), UserId::from_raw(1));
        q.author_id = Some(UserId::from_raw(2));
        q.text = Some("OFFER".to_string());
        q.include_meta = true;

        let result = handler(&store).handle(q).await.unwrap();

        assert_eq!(result.messages.total, 1);
        assert_eq!(result.messages.items[0].text(), Some("Thanks, offer received"));
        assert_eq!(result.room.map(|r| r.id()), Some(room.id()));
    }

    #[tokio::test]
    async fn descending_order_returns_newest_first() {
        let (store, room) = seeded().await;
        let mut q = ListMessagesQuery::new(room.id(), UserId::from_raw(1));
        q.direction = SortDirection::Desc;
        q.page_size = Some(1);

        let result = handler(&store).handle(q).await.unwrap();
        assert_eq!(result.messages.items[0].text(), Some("ok"));
    }
}
