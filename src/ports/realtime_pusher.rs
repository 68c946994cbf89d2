//! Realtime pusher port - delivers notifications to one live connection.

use async_trait::async_trait;

use crate::domain::chat::ChatNotification;
use crate::domain::foundation::ConnectionId;

/// Why a push did not reach its connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PushError {
    /// No connection with this id is open on this process.
    #[error("Connection not found: {0}")]
    ConnectionGone(ConnectionId),

    /// The connection's outbound buffer is full.
    #[error("Outbound buffer full for connection {0}")]
    BufferFull(ConnectionId),
}

#[async_trait]
pub trait RealtimePusher: Send + Sync {
    async fn push(
        &self,
        connection_id: &ConnectionId,
        notification: ChatNotification,
    ) -> Result<(), PushError>;
}
