//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! `ChatServices` wires every handler from one set of ports; the HTTP and
//! websocket adapters share it.

pub mod fanout;
pub mod handlers;
mod policy;

use std::sync::Arc;

pub use fanout::{Fanout, FanoutReport};
pub use handlers::*;
pub use policy::ChatPolicy;

use crate::ports::{
    ConnectionRegistry, HireDirectory, IdentityProvider, MatchQueue, MessageRepository,
    RealtimePusher, RoomRepository,
};

/// Every port the chat handlers depend on.
#[derive(Clone)]
pub struct ChatPorts {
    pub rooms: Arc<dyn RoomRepository>,
    pub messages: Arc<dyn MessageRepository>,
    pub queue: Arc<dyn MatchQueue>,
    pub registry: Arc<dyn ConnectionRegistry>,
    pub identities: Arc<dyn IdentityProvider>,
    pub hires: Arc<dyn HireDirectory>,
    pub pusher: Arc<dyn RealtimePusher>,
}

/// All chat handlers, ready to be shared across transports.
#[derive(Clone)]
pub struct ChatServices {
    pub join_queue: Arc<JoinQueueHandler>,
    pub connect: Arc<ConnectHandler>,
    pub disconnect: Arc<DisconnectHandler>,
    pub create_direct_room: Arc<CreateDirectRoomHandler>,
    pub open_hire_room: Arc<OpenHireRoomHandler>,
    pub get_room: Arc<GetRoomHandler>,
    pub list_rooms: Arc<ListRoomsHandler>,
    pub send_message: Arc<SendMessageHandler>,
    pub list_messages: Arc<ListMessagesHandler>,
    pub room_history: Arc<RoomHistoryHandler>,
    pub mark_read: Arc<MarkReadHandler>,
    pub unread_count: Arc<UnreadCountHandler>,
    pub attach_meeting_event: Arc<AttachMeetingEventHandler>,
}

impl ChatServices {
    pub fn new(ports: ChatPorts, policy: ChatPolicy) -> Self {
        let fanout = Arc::new(Fanout::new(
            ports.registry.clone(),
            ports.pusher.clone(),
            ports.messages.clone(),
        ));

        Self {
            join_queue: Arc::new(JoinQueueHandler::new(
                ports.identities.clone(),
                ports.queue.clone(),
                fanout.clone(),
                policy,
            )),
            connect: Arc::new(ConnectHandler::new(ports.registry.clone())),
            disconnect: Arc::new(DisconnectHandler::new(
                ports.registry.clone(),
                ports.queue.clone(),
                policy,
            )),
            create_direct_room: Arc::new(CreateDirectRoomHandler::new(
                ports.rooms.clone(),
                ports.identities.clone(),
                ports.registry.clone(),
                fanout.clone(),
            )),
            open_hire_room: Arc::new(OpenHireRoomHandler::new(
                ports.rooms.clone(),
                ports.identities.clone(),
                ports.registry.clone(),
            )),
            get_room: Arc::new(GetRoomHandler::new(ports.rooms.clone())),
            list_rooms: Arc::new(ListRoomsHandler::new(
                ports.rooms.clone(),
                ports.identities.clone(),
                ports.hires.clone(),
                policy,
            )),
            send_message: Arc::new(SendMessageHandler::new(
                ports.rooms.clone(),
                ports.messages.clone(),
                fanout.clone(),
            )),
            list_messages: Arc::new(ListMessagesHandler::new(
                ports.rooms.clone(),
                ports.messages.clone(),
                policy,
            )),
            room_history: Arc::new(RoomHistoryHandler::new(
                ports.rooms.clone(),
                ports.messages.clone(),
            )),
            mark_read: Arc::new(MarkReadHandler::new(
                ports.rooms.clone(),
                ports.messages.clone(),
                fanout,
            )),
            unread_count: Arc::new(UnreadCountHandler::new(ports.messages.clone())),
            attach_meeting_event: Arc::new(AttachMeetingEventHandler::new(ports.messages)),
        }
    }
}
