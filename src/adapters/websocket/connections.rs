//! Live connection table for this process.
//!
//! Each open socket owns a bounded outbound channel. The hub maps
//! connection ids to the sending half so the application layer can push to
//! a connection knowing only its id.
//!
//! # Architecture
//!
//! ```text
//! Fanout ──push(conn-a)──▶ ConnectionHub ──mpsc──▶ socket task ──▶ client a
//!                              │
//!                              └──────────mpsc──▶ socket task ──▶ client b
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{mpsc, RwLock};

use crate::domain::chat::ChatNotification;
use crate::domain::foundation::ConnectionId;
use crate::ports::{PushError, RealtimePusher};

use super::messages::ServerMessage;

/// Routes outbound messages to open sockets.
///
/// # Thread Safety
///
/// Uses `RwLock` for the connection table since pushes (reads) vastly
/// outnumber connects/disconnects (writes).
pub struct ConnectionHub {
    connections: RwLock<HashMap<ConnectionId, mpsc::Sender<ServerMessage>>>,

    /// Outbound buffer per connection.
    channel_capacity: usize,
}

impl ConnectionHub {
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            channel_capacity: channel_capacity.max(1),
        }
    }

    /// Opens a connection with a fresh server-generated id.
    ///
    /// The socket task drains the returned receiver.
    pub async fn register(&self) -> (ConnectionId, mpsc::Receiver<ServerMessage>) {
        let connection_id = ConnectionId::generate();
        let (tx, rx) = mpsc::channel(self.channel_capacity);
        self.connections
            .write()
            .await
            .insert(connection_id.clone(), tx);
        (connection_id, rx)
    }

    /// Forgets a connection. Later sends to it report `ConnectionGone`.
    pub async fn remove(&self, connection_id: &ConnectionId) {
        self.connections.write().await.remove(connection_id);
    }

    /// Queues a message for one connection without waiting.
    pub async fn send(
        &self,
        connection_id: &ConnectionId,
        message: ServerMessage,
    ) -> Result<(), PushError> {
        let connections = self.connections.read().await;
        let sender = connections
            .get(connection_id)
            .ok_or_else(|| PushError::ConnectionGone(connection_id.clone()))?;

        sender.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => PushError::BufferFull(connection_id.clone()),
            mpsc::error::TrySendError::Closed(_) => {
                PushError::ConnectionGone(connection_id.clone())
            }
        })
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}

impl Default for ConnectionHub {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl RealtimePusher for ConnectionHub {
    async fn push(
        &self,
        connection_id: &ConnectionId,
        notification: ChatNotification,
    ) -> Result<(), PushError> {
        self.send(connection_id, notification.into()).await
    }
}
