//! ConnectionRegistry port - maps durable memberships to live connections.
//!
//! A membership row records which live connection currently represents its
//! user in that room. This port is the only writer of that field.
//!
//! ## Lifecycle
//!
//! 1. User connects; the gateway calls `bind_all_memberships`
//! 2. Fan-out resolves `live_members_for_room` and pushes to each connection
//! 3. User disconnects; the gateway calls `unbind_connection`
//! 4. User reconnects under a new connection id; step 1 rebinds every room
//!
//! A connection id resolved by fan-out may already be gone by the time the
//! push happens; pushers treat that as a soft miss.

use async_trait::async_trait;

use crate::domain::foundation::{ConnectionId, DomainError, RoomId, UserId};

/// A room member with a live connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LiveMember {
    pub user_id: UserId,
    pub connection_id: ConnectionId,
}

/// Port for binding live connections to room memberships.
///
/// # Example
///
/// ```ignore
/// // On connect:
/// let rooms = registry.bind_all_memberships(user_id, &connection_id).await?;
///
/// // On disconnect:
/// registry.unbind_connection(&connection_id).await?;
/// ```
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// Sets `connection_id` on every membership of the user.
    ///
    /// Returns the ids of all rooms the user belongs to.
    async fn bind_all_memberships(
        &self,
        user_id: UserId,
        connection_id: &ConnectionId,
    ) -> Result<Vec<RoomId>, DomainError>;

    /// Sets `connection_id` on a single membership.
    ///
    /// # Errors
    ///
    /// - `MembershipNotFound` if the user is not a member of the room
    async fn bind_membership(
        &self,
        user_id: UserId,
        room_id: RoomId,
        connection_id: &ConnectionId,
    ) -> Result<(), DomainError>;

    /// Clears `connection_id` on every membership holding it.
    ///
    /// Idempotent: an unknown or already-unbound id clears nothing.
    /// Returns the number of memberships cleared.
    async fn unbind_connection(&self, connection_id: &ConnectionId) -> Result<u64, DomainError>;

    /// Any live connection currently bound for the user, if one exists.
    async fn connection_for_user(&self, user_id: UserId)
        -> Result<Option<ConnectionId>, DomainError>;

    /// All non-null connection ids among the room's memberships.
    async fn live_connections_for_room(
        &self,
        room_id: RoomId,
    ) -> Result<Vec<ConnectionId>, DomainError>;

    /// Same as `live_connections_for_room`, with the owning user.
    async fn live_members_for_room(&self, room_id: RoomId) -> Result<Vec<LiveMember>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_registry_is_object_safe() {
        fn _accepts_dyn(_registry: &dyn ConnectionRegistry) {}
    }
}
