//! `ConnectionRegistry` over the in-memory store.

use async_trait::async_trait;

use super::InMemoryChatStore;
use crate::domain::foundation::{ConnectionId, DomainError, ErrorCode, RoomId, UserId};
use crate::ports::{ConnectionRegistry, LiveMember};

#[async_trait]
impl ConnectionRegistry for InMemoryChatStore {
    async fn bind_all_memberships(
        &self,
        user_id: UserId,
        connection_id: &ConnectionId,
    ) -> Result<Vec<RoomId>, DomainError> {
        let mut state = self.state();
        let mut rooms = Vec::new();
        for membership in state.memberships.values_mut() {
            if membership.user_id() == user_id {
                membership.bind(connection_id.clone());
                rooms.push(membership.room_id());
            }
        }
        Ok(rooms)
    }

    async fn bind_membership(
        &self,
        user_id: UserId,
        room_id: RoomId,
        connection_id: &ConnectionId,
    ) -> Result<(), DomainError> {
        let mut state = self.state();
        let membership = state.memberships.get_mut(&(room_id, user_id)).ok_or_else(|| {
            DomainError::new(ErrorCode::MembershipNotFound, "Membership not found")
        })?;
        membership.bind(connection_id.clone());
        Ok(())
    }

    async fn unbind_connection(&self, connection_id: &ConnectionId) -> Result<u64, DomainError> {
        let mut state = self.state();
        let cleared = state
            .memberships
            .values_mut()
            .map(|m| m.unbind(connection_id))
            .filter(|cleared| *cleared)
            .count();
        Ok(cleared as u64)
    }

    async fn connection_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<ConnectionId>, DomainError> {
        Ok(self
            .state()
            .memberships
            .values()
            .filter(|m| m.user_id() == user_id)
            .find_map(|m| m.connection_id().cloned()))
    }

    async fn live_connections_for_room(
        &self,
        room_id: RoomId,
    ) -> Result<Vec<ConnectionId>, DomainError> {
        Ok(self
            .live_members_for_room(room_id)
            .await?
            .into_iter()
            .map(|m| m.connection_id)
            .collect())
    }

    async fn live_members_for_room(&self, room_id: RoomId) -> Result<Vec<LiveMember>, DomainError> {
        Ok(self
            .state()
            .memberships
            .values()
            .filter(|m| m.room_id() == room_id)
            .filter_map(|m| {
                m.connection_id().map(|c| LiveMember {
                    user_id: m.user_id(),
                    connection_id: c.clone(),
                })
            })
            .collect())
    }
}
