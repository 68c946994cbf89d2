//! Fanout - pushes notifications to every live connection of a room.
//!
//! Fan-out runs after persistence and never fails the operation that
//! triggered it. Undeliverable pushes are soft misses logged at debug;
//! registry lookups that fail are logged at error and abandoned.

use std::sync::Arc;

use crate::domain::chat::{ChatNotification, FormedMatch, Message};
use crate::domain::foundation::{ConnectionId, UserId};
use crate::ports::{ConnectionRegistry, MessageRepository, RealtimePusher};

/// Counts of one fan-out pass, for logs and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanoutReport {
    pub delivered: usize,
    pub missed: usize,
}

pub struct Fanout {
    registry: Arc<dyn ConnectionRegistry>,
    pusher: Arc<dyn RealtimePusher>,
    messages: Arc<dyn MessageRepository>,
}

impl Fanout {
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        pusher: Arc<dyn RealtimePusher>,
        messages: Arc<dyn MessageRepository>,
    ) -> Self {
        Self {
            registry,
            pusher,
            messages,
        }
    }

    /// Pushes `newMessage` to every live member of the message's room, then
    /// a fresh `unreadCount` to every live member other than the author.
    pub async fn message_created(&self, message: &Message) -> FanoutReport {
        let room_id = message.room_id();
        let live = match self.registry.live_members_for_room(room_id).await {
            Ok(live) => live,
            Err(e) => {
                tracing::error!(room_id = %room_id, error = %e, "Failed to resolve live connections");
                return FanoutReport::default();
            }
        };

        let mut report = FanoutReport::default();
        let notification = ChatNotification::new_message(message);
        for member in &live {
            self.deliver(&member.connection_id, notification.clone(), &mut report)
                .await;
        }

        for member in live.iter().filter(|m| m.user_id != message.user_id()) {
            self.unread_changed(member.user_id, &member.connection_id, &mut report)
                .await;
        }

        tracing::debug!(
            room_id = %room_id,
            message_id = %message.id(),
            delivered = report.delivered,
            missed = report.missed,
            "Message fan-out complete"
        );
        report
    }

    /// Tells every matched connection which room it landed in.
    pub async fn room_assigned(&self, formed: &FormedMatch) -> FanoutReport {
        let mut report = FanoutReport::default();
        for connection_id in formed.connection_ids() {
            let notification = ChatNotification::RoomAssigned {
                room_id: formed.room_id,
            };
            self.deliver(connection_id, notification, &mut report).await;
        }
        report
    }

    /// Pushes the user's current unread total to one connection.
    pub async fn unread_for(&self, user_id: UserId, connection_id: &ConnectionId) -> FanoutReport {
        let mut report = FanoutReport::default();
        self.unread_changed(user_id, connection_id, &mut report).await;
        report
    }

    async fn unread_changed(
        &self,
        user_id: UserId,
        connection_id: &ConnectionId,
        report: &mut FanoutReport,
    ) {
        match self.messages.unread_count(user_id).await {
            Ok(count) => {
                self.deliver(connection_id, ChatNotification::UnreadCount { count }, report)
                    .await
            }
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Failed to compute unread count");
                report.missed += 1;
            }
        }
    }

    async fn deliver(
        &self,
        connection_id: &ConnectionId,
        notification: ChatNotification,
        report: &mut FanoutReport,
    ) {
        let kind = notification.kind();
        match self.pusher.push(connection_id, notification).await {
            Ok(()) => report.delivered += 1,
            Err(e) => {
                tracing::debug!(connection_id = %connection_id, kind, error = %e, "Delivery missed");
                report.missed += 1;
            }
        }
    }
}
