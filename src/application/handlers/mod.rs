//! Application handlers.
//!
//! One handler per operation. Handlers validate input, enforce membership,
//! call storage ports, and trigger fan-out after persistence.

pub mod matching;
pub mod messages;
pub mod presence;
pub mod rooms;

#[cfg(test)]
pub(crate) mod testing;

use std::future::Future;

use crate::domain::chat::{ChatError, Membership};
use crate::domain::foundation::{DomainError, ErrorCode, RoomId, UserId};
use crate::ports::RoomRepository;

pub use matching::{JoinQueueCommand, JoinQueueHandler, JoinQueueResult};
pub use messages::{
    AttachMeetingEventCommand, AttachMeetingEventHandler, ListMessagesHandler, ListMessagesQuery,
    ListMessagesResult, MarkReadCommand, MarkReadHandler, MarkReadResult, RoomHistoryHandler,
    RoomHistoryQuery, SendMessageCommand, SendMessageHandler, UnreadCountHandler,
    UnreadCountQuery,
};
pub use presence::{ConnectHandler, DisconnectHandler, DisconnectResult};
pub use rooms::{
    CreateDirectRoomCommand, CreateDirectRoomHandler, CreateDirectRoomResult, GetRoomHandler,
    GetRoomQuery, ListRoomsHandler, ListRoomsQuery, OpenHireRoomCommand, OpenHireRoomHandler,
    OpenHireRoomResult,
};

/// Loads the caller's membership, answering `NotFound` for non-members.
pub(crate) async fn require_membership(
    rooms: &dyn RoomRepository,
    user_id: UserId,
    room_id: RoomId,
) -> Result<Membership, ChatError> {
    rooms
        .find_membership(user_id, room_id)
        .await?
        .ok_or_else(ChatError::room_not_found)
}

/// Runs `op`, retrying once if it reports a unique-constraint conflict.
pub(crate) async fn retry_once_on_conflict<T, F, Fut>(mut op: F) -> Result<T, DomainError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DomainError>>,
{
    match op().await {
        Err(e) if e.code == ErrorCode::Conflict => {
            tracing::warn!(error = %e, "Unique conflict, retrying once");
            op().await
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retry_once_recovers_from_single_conflict() {
        let calls = AtomicU32::new(0);
        let result = retry_once_on_conflict(|| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(DomainError::new(ErrorCode::Conflict, "duplicate"))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn retry_once_gives_up_after_second_conflict() {
        let calls = AtomicU32::new(0);
        let result: Result<(), DomainError> = retry_once_on_conflict(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(DomainError::new(ErrorCode::Conflict, "duplicate")) }
        })
        .await;

        assert_eq!(result.unwrap_err().code, ErrorCode::Conflict);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), DomainError> = retry_once_on_conflict(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(DomainError::new(ErrorCode::DatabaseError, "down")) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
