//! CreateDirectRoomHandler - opens a two-person room with a first message.

use std::sync::Arc;

use crate::application::Fanout;
use crate::domain::chat::{ChatError, Message, NewRoom, Room, MAX_TEXT_LENGTH};
use crate::domain::foundation::{UserId, ValidationError};
use crate::ports::{ConnectionRegistry, IdentityProvider, RoomRepository};

use super::bind_live_members;

#[derive(Debug, Clone)]
pub struct CreateDirectRoomCommand {
    pub host_id: UserId,
    pub other_user_id: UserId,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct CreateDirectRoomResult {
    pub room: Room,
    pub message: Message,
}

pub struct CreateDirectRoomHandler {
    rooms: Arc<dyn RoomRepository>,
    identities: Arc<dyn IdentityProvider>,
    registry: Arc<dyn ConnectionRegistry>,
    fanout: Arc<Fanout>,
}

impl CreateDirectRoomHandler {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        identities: Arc<dyn IdentityProvider>,
        registry: Arc<dyn ConnectionRegistry>,
        fanout: Arc<Fanout>,
    ) -> Self {
        Self {
            rooms,
            identities,
            registry,
            fanout,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateDirectRoomCommand,
    ) -> Result<CreateDirectRoomResult, ChatError> {
        if cmd.host_id == cmd.other_user_id {
            return Err(ChatError::validation("userId", "Cannot open a room with yourself"));
        }
        let text = cmd.text.trim().to_string();
        if text.is_empty() {
            return Err(ValidationError::empty_field("text").into());
        }
        let len = text.chars().count();
        if len > MAX_TEXT_LENGTH {
            return Err(
                ValidationError::out_of_range("text", 1, MAX_TEXT_LENGTH as i32, len as i32).into(),
            );
        }

        let found = self.identities.find_many(&[cmd.other_user_id]).await?;
        if found.is_empty() {
            return Err(ChatError::not_found("User not found"));
        }

        let members = [cmd.host_id, cmd.other_user_id];
        let (room, message) = self
            .rooms
            .create_with_opening_message(NewRoom::direct(cmd.host_id), &members, cmd.host_id, text)
            .await?;

        tracing::info!(room_id = %room.id(), host_id = %cmd.host_id, "Direct room created");

        bind_live_members(self.registry.as_ref(), room.id(), &members).await;
        self.fanout.message_created(&message).await;

        Ok(CreateDirectRoomResult { room, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryChatStore, InMemoryIdentityProvider};
    use crate::application::handlers::testing::RecordingPusher;
    use crate::domain::chat::{ChatNotification, Participant};
    use crate::domain::foundation::ConnectionId;
    use crate::ports::MessageRepository;

    struct Fixture {
        store: Arc<InMemoryChatStore>,
        pusher: Arc<RecordingPusher>,
        handler: CreateDirectRoomHandler,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryChatStore::new());
        let identities = Arc::new(InMemoryIdentityProvider::new());
        identities.insert(Participant::new(UserId::from_raw(1)).with_name("Host"));
        identities.insert(Participant::new(UserId::from_raw(2)).with_name("Guest"));
        let pusher = Arc::new(RecordingPusher::new());
        let fanout = Arc::new(Fanout::new(store.clone(), pusher.clone(), store.clone()));
        let handler = CreateDirectRoomHandler::new(store.clone(), identities, store.clone(), fanout);
        Fixture {
            store,
            pusher,
            handler,
        }
    }

    fn cmd(text: &str) -> CreateDirectRoomCommand {
        CreateDirectRoomCommand {
            host_id: UserId::from_raw(1),
            other_user_id: UserId::from_raw(2),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn creates_room_members_and_opening_message() {
        let f = fixture();
        let result = f.handler.handle(cmd("Hello there")).await.unwrap();

        assert_eq!(result.room.host_id(), Some(UserId::from_raw(1)));
        assert_eq!(result.message.text(), Some("Hello there"));
        let members = f.store.memberships_of_room(result.room.id()).await.unwrap();
        assert_eq!(members.len(), 2);
        let history = f.store.history(result.room.id()).await.unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn rejects_self_room_and_blank_text() {
        let f = fixture();
        let mut own = cmd("hi");
        own.other_user_id = own.host_id;

        assert!(matches!(
            f.handler.handle(own).await,
            Err(ChatError::Validation { .. })
        ));
        assert!(matches!(
            f.handler.handle(cmd("   ")).await,
            Err(ChatError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn unknown_counterpart_is_not_found() {
        let f = fixture();
        let mut unknown = cmd("hi");
        unknown.other_user_id = UserId::from_raw(99);

        assert!(matches!(
            f.handler.handle(unknown).await,
            Err(ChatError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn already_connected_counterpart_receives_opening_message() {
        let f = fixture();
        // The guest is live in an earlier room.
        let earlier = f.handler.handle(cmd("first")).await.unwrap();
        let conn = ConnectionId::generate();
        f.pusher.open(&conn);
        f.store
            .bind_all_memberships(UserId::from_raw(2), &conn)
            .await
            .unwrap();

        let second = f.handler.handle(cmd("second")).await.unwrap();

        assert_ne!(earlier.room.id(), second.room.id());
        let received = f.pusher.received(&conn);
        assert!(received.iter().any(|n| matches!(
            n,
            ChatNotification::NewMessage { room_id, .. } if *room_id == second.room.id()
        )));
    }
}
