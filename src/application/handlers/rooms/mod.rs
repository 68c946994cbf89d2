//! Room handlers: creation, lookup and listing.

mod create_direct_room;
mod get_room;
mod list_rooms;
mod open_hire_room;

pub use create_direct_room::{
    CreateDirectRoomCommand, CreateDirectRoomHandler, CreateDirectRoomResult,
};
pub use get_room::{GetRoomHandler, GetRoomQuery};
pub use list_rooms::{ListRoomsHandler, ListRoomsQuery};
pub use open_hire_room::{OpenHireRoomCommand, OpenHireRoomHandler, OpenHireRoomResult};

use crate::domain::foundation::{RoomId, UserId};
use crate::ports::ConnectionRegistry;

/// Binds each new member's current live connection (if any) to the room so
/// they receive its traffic without reconnecting. Failures only log.
pub(crate) async fn bind_live_members(
    registry: &dyn ConnectionRegistry,
    room_id: RoomId,
    members: &[UserId],
) {
    for user_id in members {
        let connection = match registry.connection_for_user(*user_id).await {
            Ok(Some(connection)) => connection,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Failed to look up live connection");
                continue;
            }
        };
        if let Err(e) = registry.bind_membership(*user_id, room_id, &connection).await {
            tracing::warn!(
                user_id = %user_id,
                room_id = %room_id,
                error = %e,
                "Failed to bind live connection to new room"
            );
        }
    }
}
