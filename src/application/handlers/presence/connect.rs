//! ConnectHandler - binds a fresh live connection to all of a user's rooms.

use std::sync::Arc;

use crate::domain::chat::ChatError;
use crate::domain::foundation::{ConnectionId, RoomId, UserId};
use crate::ports::ConnectionRegistry;

pub struct ConnectHandler {
    registry: Arc<dyn ConnectionRegistry>,
}

impl ConnectHandler {
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the rooms the connection now represents the user in.
    pub async fn handle(
        &self,
        user_id: UserId,
        connection_id: &ConnectionId,
    ) -> Result<Vec<RoomId>, ChatError> {
        let rooms = self
            .registry
            .bind_all_memberships(user_id, connection_id)
            .await?;
        tracing::info!(
            user_id = %user_id,
            connection_id = %connection_id,
            rooms = rooms.len(),
            "Connection bound"
        );
        Ok(rooms)
    }
}
