//! Match queue port.
//!
//! # Contract
//!
//! `enqueue_and_match` stores the entry and, in the same serialised unit,
//! claims the oldest `participants` entries of that bucket if there are
//! enough. Claiming creates the room, adds every claimed user as a member
//! bound to the entry's connection, and deletes the claimed entries. Two
//! concurrent calls for the same bucket must never claim the same entry.

use async_trait::async_trait;

use crate::domain::chat::{FormedMatch, GroupSize, JoinRequest, QueueEntry};
use crate::domain::foundation::{ConnectionId, DomainError};

#[async_trait]
pub trait MatchQueue: Send + Sync {
    /// Enqueues `request` and attempts a match for its bucket.
    ///
    /// A user already waiting in the bucket keeps their position; only the
    /// connection id is refreshed.
    ///
    /// Returns the formed room when this call completed a group.
    async fn enqueue_and_match(
        &self,
        request: JoinRequest,
    ) -> Result<Option<FormedMatch>, DomainError>;

    /// Removes every waiting entry owned by the connection. Returns how many.
    async fn dequeue_connection(&self, connection_id: &ConnectionId) -> Result<u64, DomainError>;

    /// Entries waiting for the given bucket, oldest first.
    async fn waiting(&self, participants: GroupSize) -> Result<Vec<QueueEntry>, DomainError>;
}
