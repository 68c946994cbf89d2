//! Chat domain module.
//!
//! Rooms, memberships (read cursor and live connection), messages with their
//! display payloads, and the matching queue.

mod errors;
mod membership;
mod message;
mod notifications;
mod participant;
mod queue;
mod room;

pub use errors::ChatError;
pub use membership::{cursor_advances, Membership};
pub use message::{
    Attachments, MeetingDatePayload, Message, MessageDisplay, NewMessage, MAX_TEXT_LENGTH,
};
pub use notifications::ChatNotification;
pub use participant::Participant;
pub use queue::{
    matched_room_name, select_match, FormedMatch, GroupSize, JoinRequest, MatchedMember,
    QueueEntry,
};
pub use room::{NewRoom, Room, RoomOrigin, RoomSummary, MAX_ROOM_NAME_LENGTH};
