//! Room repository port.
//!
//! Owns rooms and memberships. Room creation and its initial memberships
//! are always one atomic unit: either every insert lands or none does.

use async_trait::async_trait;

use crate::domain::chat::{Membership, Message, NewRoom, Room};
use crate::domain::foundation::{
    DomainError, HireId, MessageId, Page, PageRequest, RoomId, SortDirection, Timestamp, UserId,
};

/// Field a room listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoomSortField {
    /// Time of the newest message; rooms without messages sort last.
    #[default]
    LastMessageAt,
    CreatedAt,
}

/// Ordering of a room listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomSort {
    pub field: RoomSortField,
    pub direction: SortDirection,
}

impl Default for RoomSort {
    fn default() -> Self {
        Self {
            field: RoomSortField::LastMessageAt,
            direction: SortDirection::Desc,
        }
    }
}

/// Filters for listing a member's rooms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomQuery {
    /// Every word must appear in the room name (case-insensitive).
    pub text: Option<String>,
    /// Restrict to rooms linked to one of these hires. `Some(vec![])` matches nothing.
    pub hire_ids: Option<Vec<HireId>>,
    /// Restrict to rooms the given other user is also a member of.
    pub companion_id: Option<UserId>,
    pub sort: RoomSort,
}

/// One row of a member's room listing, before companions are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomListing {
    pub room: Room,
    pub unread_messages_count: u64,
    pub last_message_timestamp: Option<Timestamp>,
    pub member_ids: Vec<UserId>,
}

/// Lookup key for hire-linked rooms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HireRoomCriteria {
    pub host_id: UserId,
    pub hire_id: Option<HireId>,
    pub name: Option<String>,
}

#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Creates a room, its memberships and an opening message in one transaction.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure (nothing is left behind)
    async fn create_with_opening_message(
        &self,
        room: NewRoom,
        members: &[UserId],
        author: UserId,
        text: String,
    ) -> Result<(Room, Message), DomainError>;

    /// Finds the hire room matching `criteria` exactly, or creates it.
    ///
    /// Returns the room and whether it was created by this call.
    async fn find_or_create_hire_room(
        &self,
        room: NewRoom,
        criteria: &HireRoomCriteria,
    ) -> Result<(Room, bool), DomainError>;

    async fn find_by_id(&self, id: RoomId) -> Result<Option<Room>, DomainError>;

    /// Idempotent membership upsert on `(user_id, room_id)`.
    ///
    /// # Errors
    ///
    /// - `Conflict` if a concurrent insert still collides after one retry
    async fn add_member(&self, user_id: UserId, room_id: RoomId) -> Result<(), DomainError>;

    async fn find_membership(
        &self,
        user_id: UserId,
        room_id: RoomId,
    ) -> Result<Option<Membership>, DomainError>;

    async fn memberships_of_room(&self, room_id: RoomId) -> Result<Vec<Membership>, DomainError>;

    /// Advances the member's read cursor if `message_id` is strictly greater
    /// than the stored one. Returns whether the cursor moved.
    ///
    /// # Errors
    ///
    /// - `MembershipNotFound` if the user is not a member
    async fn advance_read_cursor(
        &self,
        user_id: UserId,
        room_id: RoomId,
        message_id: MessageId,
    ) -> Result<bool, DomainError>;

    /// Rooms the user belongs to, annotated with unread count and last
    /// message time.
    async fn list_for_member(
        &self,
        user_id: UserId,
        query: &RoomQuery,
        page: PageRequest,
    ) -> Result<Page<RoomListing>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn RoomRepository) {}
    }

    #[test]
    fn default_sort_is_newest_activity_first() {
        let sort = RoomSort::default();
        assert_eq!(sort.field, RoomSortField::LastMessageAt);
        assert_eq!(sort.direction, SortDirection::Desc);
    }
}
