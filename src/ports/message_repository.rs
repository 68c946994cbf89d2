//! Message repository port.

use async_trait::async_trait;

use crate::domain::chat::{Message, MessageDisplay, NewMessage};
use crate::domain::foundation::{
    DomainError, MessageId, Page, PageRequest, RoomId, SortDirection, UserId,
};

/// Filters for a room's message listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageQuery {
    /// Only messages by this author.
    pub author_id: Option<UserId>,
    /// Every word must appear in the text (case-insensitive).
    pub text: Option<String>,
    /// Ordering by creation time. Messages created at the same instant are
    /// ordered by text relevance (when `text` is set), then by id.
    pub direction: SortDirection,
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persists a message, assigning id and creation time.
    async fn append(&self, message: NewMessage) -> Result<Message, DomainError>;

    async fn find_by_id(&self, id: MessageId) -> Result<Option<Message>, DomainError>;

    /// Replaces the display payloads of a stored message.
    ///
    /// # Errors
    ///
    /// - `MessageNotFound` if the message doesn't exist
    async fn update_display(
        &self,
        id: MessageId,
        display: &[MessageDisplay],
    ) -> Result<(), DomainError>;

    async fn list_for_room(
        &self,
        room_id: RoomId,
        query: &MessageQuery,
        page: PageRequest,
    ) -> Result<Page<Message>, DomainError>;

    /// Every message of the room in creation order.
    async fn history(&self, room_id: RoomId) -> Result<Vec<Message>, DomainError>;

    /// Messages across all of the user's rooms newer than that room's read
    /// cursor (all of them when the cursor is unset). Order is `(created_at, id)`.
    async fn unread_count(&self, user_id: UserId) -> Result<u64, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn MessageRepository) {}
    }
}
