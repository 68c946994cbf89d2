//! Message handlers: send, read, list, unread counts and display enrichment.

mod attach_meeting_event;
mod list_messages;
mod mark_read;
mod room_history;
mod send_message;
mod unread_count;

pub use attach_meeting_event::{AttachMeetingEventCommand, AttachMeetingEventHandler};
pub use list_messages::{ListMessagesHandler, ListMessagesQuery, ListMessagesResult};
pub use mark_read::{MarkReadCommand, MarkReadHandler, MarkReadResult};
pub use room_history::{RoomHistoryHandler, RoomHistoryQuery};
pub use send_message::{SendMessageCommand, SendMessageHandler};
pub use unread_count::{UnreadCountHandler, UnreadCountQuery};
