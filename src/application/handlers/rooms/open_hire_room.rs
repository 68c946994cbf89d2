//! OpenHireRoomHandler - find-or-create the room tied to a hire and its host.
//!
//! Idempotent: calling it again with the same host, hire and name returns
//! the same room, and the membership upserts change nothing.

use std::sync::Arc;

use crate::application::handlers::retry_once_on_conflict;
use crate::domain::chat::{ChatError, NewRoom, Room};
use crate::domain::foundation::{HireId, UserId};
use crate::ports::{ConnectionRegistry, HireRoomCriteria, IdentityProvider, RoomRepository};

use super::bind_live_members;

#[derive(Debug, Clone)]
pub struct OpenHireRoomCommand {
    pub host_id: UserId,
    pub counterpart_id: UserId,
    pub hire_id: Option<HireId>,
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OpenHireRoomResult {
    pub room: Room,
    pub created: bool,
}

pub struct OpenHireRoomHandler {
    rooms: Arc<dyn RoomRepository>,
    identities: Arc<dyn IdentityProvider>,
    registry: Arc<dyn ConnectionRegistry>,
}

impl OpenHireRoomHandler {
    pub fn new(
        rooms: Arc<dyn RoomRepository>,
        identities: Arc<dyn IdentityProvider>,
        registry: Arc<dyn ConnectionRegistry>,
    ) -> Self {
        Self {
            rooms,
            identities,
            registry,
        }
    }

    pub async fn handle(&self, cmd: OpenHireRoomCommand) -> Result<OpenHireRoomResult, ChatError> {
        if cmd.host_id == cmd.counterpart_id {
            return Err(ChatError::validation("userId", "Cannot open a room with yourself"));
        }
        if self.identities.find_many(&[cmd.counterpart_id]).await?.is_empty() {
            return Err(ChatError::not_found("User not found"));
        }

        let new_room = NewRoom::hire(cmd.name, cmd.host_id, cmd.hire_id)?;
        let criteria = HireRoomCriteria {
            host_id: cmd.host_id,
            hire_id: new_room.hire_id,
            name: new_room.name.clone(),
        };

        let (room, created) = retry_once_on_conflict(|| {
            self.rooms
                .find_or_create_hire_room(new_room.clone(), &criteria)
        })
        .await?;

        let members = [cmd.host_id, cmd.counterpart_id];
        for user_id in members {
            retry_once_on_conflict(|| self.rooms.add_member(user_id, room.id())).await?;
        }

        tracing::info!(
            room_id = %room.id(),
            hire_id = ?room.hire_id(),
            created,
            "Hire room opened"
        );

        bind_live_members(self.registry.as_ref(), room.id(), &members).await;

        Ok(OpenHireRoomResult { room, created })
    }
}
