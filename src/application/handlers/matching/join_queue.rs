//! JoinQueueHandler - resolves the caller's identity and enqueues them for
//! a room of the requested size.
//!
//! Used by both the realtime `joinChat` event and HTTP join-by-identity.
//! Identity is resolved before the entry is stored, so a stored entry can
//! always be turned into a member when its match forms. A caller that is
//! already known (token, or an identity adopted by an earlier join) is
//! enqueued under that id and never resolved again.

use std::sync::Arc;

use crate::application::{ChatPolicy, Fanout};
use crate::domain::chat::{ChatError, JoinRequest, Participant};
use crate::domain::foundation::{ConnectionId, RoomId, UserId};
use crate::ports::{IdentityProvider, MatchQueue};

/// Command to wait for a room.
#[derive(Debug, Clone)]
pub struct JoinQueueCommand {
    /// Identity the caller already holds; skips resolution when set.
    pub user_id: Option<UserId>,
    pub email: Option<String>,
    pub name: String,
    pub participants: u32,
    pub connection_id: Option<ConnectionId>,
}

/// Result of an enqueue.
#[derive(Debug, Clone)]
pub struct JoinQueueResult {
    /// The identity the entry was filed under.
    pub participant: Participant,
    /// Set when this enqueue completed a group.
    pub room_id: Option<RoomId>,
}

pub struct JoinQueueHandler {
    identities: Arc<dyn IdentityProvider>,
    queue: Arc<dyn MatchQueue>,
    fanout: Arc<Fanout>,
    policy: ChatPolicy,
}

impl JoinQueueHandler {
    pub fn new(
        identities: Arc<dyn IdentityProvider>,
        queue: Arc<dyn MatchQueue>,
        fanout: Arc<Fanout>,
        policy: ChatPolicy,
    ) -> Self {
        Self {
            identities,
            queue,
            fanout,
            policy,
        }
    }

    pub async fn handle(&self, cmd: JoinQueueCommand) -> Result<JoinQueueResult, ChatError> {
        // 1. Validate before touching any collaborator
        let participants = self.policy.group_size(cmd.participants)?;
        if cmd.name.trim().is_empty() {
            return Err(ChatError::validation("name", "Name is required"));
        }
        let email = cmd
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty());

        // 2. Resolve identity; failure fails the enqueue
        let participant = match cmd.user_id {
            Some(user_id) => Participant::new(user_id).with_name(cmd.name.trim()),
            None => self.identities.resolve_or_create(email, &cmd.name).await?,
        };

        // 3. Enqueue and attempt a match atomically
        let request = JoinRequest::new(participant.id, cmd.name, participants, cmd.connection_id)?;
        let formed = self.queue.enqueue_and_match(request).await?;

        // 4. Notify matched connections
        let room_id = match formed {
            Some(formed) => {
                tracing::info!(
                    room_id = %formed.room_id,
                    participants = participants.get(),
                    members = ?formed.user_ids(),
                    "Match formed"
                );
                self.fanout.room_assigned(&formed).await;
                Some(formed.room_id)
            }
            None => {
                tracing::debug!(
                    user_id = %participant.id,
                    participants = participants.get(),
                    "Waiting for participants"
                );
                None
            }
        };

        Ok(JoinQueueResult {
            participant,
            room_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryChatStore, InMemoryIdentityProvider};
    use crate::application::handlers::testing::RecordingPusher;
    use crate::domain::chat::{ChatNotification, GroupSize};
    use crate::domain::foundation::{DomainError, ErrorCode};
    use crate::ports::RoomRepository;
    use async_trait::async_trait;

    struct Fixture {
        store: Arc<InMemoryChatStore>,
        pusher: Arc<RecordingPusher>,
        handler: JoinQueueHandler,
    }

    fn fixture() -> Fixture {
        fixture_with(Arc::new(InMemoryIdentityProvider::new()))
    }

    fn fixture_with(identities: Arc<dyn IdentityProvider>) -> Fixture {
        let store = Arc::new(InMemoryChatStore::new());
        let pusher = Arc::new(RecordingPusher::new());
        let fanout = Arc::new(Fanout::new(store.clone(), pusher.clone(), store.clone()));
        let handler = JoinQueueHandler::new(identities, store.clone(), fanout, ChatPolicy::default());
        Fixture {
            store,
            pusher,
            handler,
        }
    }

    fn cmd(name: &str, participants: u32, conn: &ConnectionId) -> JoinQueueCommand {
        JoinQueueCommand {
            user_id: None,
            email: None,
            name: name.to_string(),
            participants,
            connection_id: Some(conn.clone()),
        }
    }

    struct BrokenIdentities;

    #[async_trait]
    impl IdentityProvider for BrokenIdentities {
        async fn resolve_or_create(
            &self,
            _email: Option<&str>,
            _name: &str,
        ) -> Result<Participant, DomainError> {
            Err(DomainError::new(ErrorCode::DatabaseError, "users table unavailable"))
        }

        async fn find_many(&self, _ids: &[UserId]) -> Result<Vec<Participant>, DomainError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn third_of_three_forms_room_and_notifies_all() {
        let f = fixture();
        let conns: Vec<ConnectionId> = (0..3).map(|_| ConnectionId::generate()).collect();
        for c in &conns {
            f.pusher.open(c);
        }

        let a = f.handler.handle(cmd("A", 3, &conns[0])).await.unwrap();
        let b = f.handler.handle(cmd("B", 3, &conns[1])).await.unwrap();
        assert!(a.room_id.is_none());
        assert!(b.room_id.is_none());

        let c = f.handler.handle(cmd("C", 3, &conns[2])).await.unwrap();
        let room_id = c.room_id.expect("room formed");

        for conn in &conns {
            assert_eq!(
                f.pusher.last_for(conn),
                Some(ChatNotification::RoomAssigned { room_id })
            );
        }
        let members = f.store.memberships_of_room(room_id).await.unwrap();
        assert_eq!(members.len(), 3);
        assert!(f.store.waiting(GroupSize::from_raw(3)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn out_of_range_size_is_rejected_before_resolution() {
        let f = fixture_with(Arc::new(BrokenIdentities));
        let err = f
            .handler
            .handle(cmd("A", 1, &ConnectionId::generate()))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Validation { .. }));
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let f = fixture();
        let err = f
            .handler
            .handle(cmd("  ", 2, &ConnectionId::generate()))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Validation { .. }));
    }

    #[tokio::test]
    async fn identity_failure_leaves_no_entry() {
        let f = fixture_with(Arc::new(BrokenIdentities));
        let err = f
            .handler
            .handle(cmd("A", 2, &ConnectionId::generate()))
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::Infrastructure(_)));
        assert!(f.store.waiting(GroupSize::from_raw(2)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn same_email_resolves_to_same_user() {
        let f = fixture();
        let mut first = cmd("Ann", 3, &ConnectionId::generate());
        first.email = Some("ann@example.com".to_string());
        let mut again = cmd("Ann", 3, &ConnectionId::generate());
        again.email = Some(" ann@example.com ".to_string());

        let r1 = f.handler.handle(first).await.unwrap();
        let r2 = f.handler.handle(again).await.unwrap();

        assert_eq!(r1.participant.id, r2.participant.id);
        assert_eq!(f.store.waiting(GroupSize::from_raw(3)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn fourth_joiner_waits_for_the_next_full_group() {
        let f = fixture();
        let conns: Vec<ConnectionId> = (0..6).map(|_| ConnectionId::generate()).collect();
        for c in &conns {
            f.pusher.open(c);
        }
        for (name, conn) in ["A", "B", "C"].iter().zip(&conns) {
            f.handler.handle(cmd(name, 3, conn)).await.unwrap();
        }

        let d = f.handler.handle(cmd("D", 3, &conns[3])).await.unwrap();
        assert!(d.room_id.is_none());
        let waiting = f.store.waiting(GroupSize::from_raw(3)).await.unwrap();
        assert_eq!(waiting.len(), 1);
        assert_eq!(waiting[0].user_id, d.participant.id);

        let e = f.handler.handle(cmd("E", 3, &conns[4])).await.unwrap();
        assert!(e.room_id.is_none());
        let last = f.handler.handle(cmd("F", 3, &conns[5])).await.unwrap();
        let room_id = last.room_id.expect("second room formed");

        let mut members: Vec<UserId> = f
            .store
            .memberships_of_room(room_id)
            .await
            .unwrap()
            .iter()
            .map(|m| m.user_id())
            .collect();
        members.sort();
        let mut expected = vec![d.participant.id, e.participant.id, last.participant.id];
        expected.sort();
        assert_eq!(members, expected);
        assert!(f.store.waiting(GroupSize::from_raw(3)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn known_user_is_enqueued_without_resolution() {
        let f = fixture_with(Arc::new(BrokenIdentities));
        let mut known = cmd("Ann", 2, &ConnectionId::generate());
        known.user_id = Some(UserId::from_raw(500));

        let result = f.handler.handle(known).await.unwrap();

        assert_eq!(result.participant.id, UserId::from_raw(500));
        let waiting = f.store.waiting(GroupSize::from_raw(2)).await.unwrap();
        assert_eq!(waiting.len(), 1);
        assert_eq!(waiting[0].user_id, UserId::from_raw(500));
    }

    #[tokio::test]
    async fn known_user_joining_twice_keeps_one_entry() {
        let f = fixture();
        let conn = ConnectionId::generate();
        let mut first = cmd("Ann", 2, &conn);
        first.user_id = Some(UserId::from_raw(7));
        let again = first.clone();

        assert!(f.handler.handle(first).await.unwrap().room_id.is_none());
        assert!(f.handler.handle(again).await.unwrap().room_id.is_none());

        assert_eq!(f.store.waiting(GroupSize::from_raw(2)).await.unwrap().len(), 1);
    }
}
