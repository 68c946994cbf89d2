//! DisconnectHandler - releases everything a closed connection held.
//!
//! Memberships keep their rows; only the live connection id is cleared.
//! Waiting queue entries owned by the connection are dropped when the
//! policy asks for it.

use std::sync::Arc;

use crate::application::ChatPolicy;
use crate::domain::chat::ChatError;
use crate::domain::foundation::ConnectionId;
use crate::ports::{ConnectionRegistry, MatchQueue};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisconnectResult {
    pub memberships_released: u64,
    pub entries_dequeued: u64,
}

pub struct DisconnectHandler {
    registry: Arc<dyn ConnectionRegistry>,
    queue: Arc<dyn MatchQueue>,
    policy: ChatPolicy,
}

impl DisconnectHandler {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        queue: Arc<dyn MatchQueue>,
        policy: ChatPolicy,
    ) -> Self {
        Self {
            registry,
            queue,
            policy,
        }
    }

    pub async fn handle(&self, connection_id: &ConnectionId) -> Result<DisconnectResult, ChatError> {
        let memberships_released = self.registry.unbind_connection(connection_id).await?;
        let entries_dequeued = if self.policy.dequeue_on_disconnect {
            self.queue.dequeue_connection(connection_id).await?
        } else {
            0
        };

        tracing::info!(
            connection_id = %connection_id,
            memberships_released,
            entries_dequeued,
            "Connection released"
        );
        Ok(DisconnectResult {
            memberships_released,
            entries_dequeued,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryChatStore;
    use crate::domain::chat::{GroupSize, JoinRequest, NewRoom};
    use crate::domain::foundation::UserId;
    use crate::ports::RoomRepository;

    async fn waiting_with(store: &InMemoryChatStore, conn: &ConnectionId) {
        let request = JoinRequest::new(
            UserId::from_raw(5),
            "Eve",
            GroupSize::from_raw(3),
            Some(conn.clone()),
        )
        .unwrap();
        store.enqueue_and_match(request).await.unwrap();
    }

    #[tokio::test]
    async fn disconnect_clears_bindings_and_queue() {
        let store = Arc::new(InMemoryChatStore::new());
        let user = UserId::from_raw(1);
        let (room, _) = store
            .create_with_opening_message(
                NewRoom::direct(user),
                &[user, UserId::from_raw(2)],
                user,
                "hi".into(),
            )
            .await
            .unwrap();
        let conn = ConnectionId::generate();
        store.bind_all_memberships(user, &conn).await.unwrap();
        waiting_with(&store, &conn).await;

        let handler = DisconnectHandler::new(store.clone(), store.clone(), ChatPolicy::default());
        let result = handler.handle(&conn).await.unwrap();

        assert_eq!(
            result,
            DisconnectResult {
                memberships_released: 1,
                entries_dequeued: 1
            }
        );
        assert!(store.live_connections_for_room(room.id()).await.unwrap().is_empty());
        assert!(store.find_membership(user, room.id()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn disconnect_is_idempotent() {
        let store = Arc::new(InMemoryChatStore::new());
        let handler = DisconnectHandler::new(store.clone(), store.clone(), ChatPolicy::default());
        let conn = ConnectionId::generate();

        assert_eq!(handler.handle(&conn).await.unwrap(), DisconnectResult::default());
        assert_eq!(handler.handle(&conn).await.unwrap(), DisconnectResult::default());
    }

    #[tokio::test]
    async fn queue_is_kept_when_policy_disables_dequeue() {
        let store = Arc::new(InMemoryChatStore::new());
        let policy = ChatPolicy {
            dequeue_on_disconnect: false,
            ..ChatPolicy::default()
        };
        let handler = DisconnectHandler::new(store.clone(), store.clone(), policy);
        let conn = ConnectionId::generate();
        waiting_with(&store, &conn).await;

        let result = handler.handle(&conn).await.unwrap();

        assert_eq!(result.entries_dequeued, 0);
        assert_eq!(store.waiting(GroupSize::from_raw(3)).await.unwrap().len(), 1);
    }
}
