//! WebSocket message types for the realtime chat gateway.
//!
//! Defines the protocol between server and connected clients:
//! - Server → Client: connection status, room assignment, messages, unread
//!   counts, request replies, errors
//! - Client → Server: join the queue, send, history, mark read, ping

use serde::{Deserialize, Serialize};

use crate::domain::chat::{ChatError, ChatNotification, Message, MessageDisplay};
use crate::domain::foundation::{MessageId, RoomId, Timestamp, UserId};

// ============================================
// Server → Client Messages
// ============================================

/// All message types that can be sent from server to client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Connection established; lists the rooms this connection is live in.
    Connected(ConnectedMessage),

    /// A queue match placed the user in a new room.
    RoomAssigned(RoomRef),

    /// A message was posted in one of the user's rooms.
    NewMessage(NewMessageMessage),

    /// Reply to `getRoomHistory`.
    RoomHistory(RoomHistoryMessage),

    /// The user's total unread count.
    UnreadCount(UnreadCountMessage),

    /// Reply to `markRead`.
    ReadAck(ReadAckMessage),

    /// Error occurred.
    Error(ErrorMessage),

    /// Heartbeat response.
    Pong(PongMessage),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedMessage {
    pub connection_id: String,
    pub rooms: Vec<RoomId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRef {
    pub room_id: RoomId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessageMessage {
    pub room_id: RoomId,
    pub message_id: MessageId,
    pub user_id: UserId,
    pub text: Option<String>,
    pub display: Vec<MessageDisplay>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomHistoryMessage {
    pub room_id: RoomId,
    pub messages: Vec<HistoryEntry>,
}

/// One message of a room history, trimmed to what the chat view renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub user_id: UserId,
    pub text: Option<String>,
    pub created_at: Timestamp,
}

impl From<&Message> for HistoryEntry {
    fn from(message: &Message) -> Self {
        Self {
            user_id: message.user_id(),
            text: message.text().map(String::from),
            created_at: *message.created_at(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnreadCountMessage {
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadAckMessage {
    pub room_id: RoomId,
    pub updated: bool,
}

/// Error message sent to client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorMessage {
    pub code: String,
    pub message: String,
    pub timestamp: String,
}

/// Heartbeat response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PongMessage {
    pub timestamp: String,
}

impl ServerMessage {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        ServerMessage::Error(ErrorMessage {
            code: code.into(),
            message: message.into(),
            timestamp: Timestamp::now().to_rfc3339(),
        })
    }

    pub fn pong() -> Self {
        ServerMessage::Pong(PongMessage {
            timestamp: Timestamp::now().to_rfc3339(),
        })
    }
}

impl From<&ChatError> for ServerMessage {
    fn from(err: &ChatError) -> Self {
        ServerMessage::error(err.code(), err.client_message())
    }
}

impl From<ChatNotification> for ServerMessage {
    fn from(notification: ChatNotification) -> Self {
        match notification {
            ChatNotification::RoomAssigned { room_id } => {
                ServerMessage::RoomAssigned(RoomRef { room_id })
            }
            ChatNotification::NewMessage {
                room_id,
                message_id,
                user_id,
                text,
                display,
                created_at,
            } => ServerMessage::NewMessage(NewMessageMessage {
                room_id,
                message_id,
                user_id,
                text,
                display,
                created_at,
            }),
            ChatNotification::UnreadCount { count } => {
                ServerMessage::UnreadCount(UnreadCountMessage { count })
            }
        }
    }
}

// ============================================
// Client → Server Messages
// ============================================

/// All message types that can be received from client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Wait in the matching queue for a room of `participants` members.
    JoinChat(JoinChatRequest),

    SendMessage(SendMessageRequest),

    GetRoomHistory(RoomRef),

    MarkRead(MarkReadRequest),

    /// Heartbeat request.
    Ping,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinChatRequest {
    pub name: String,
    pub participants: u32,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub room_id: RoomId,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub display: Vec<MessageDisplay>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    pub room_id: RoomId,
    pub last_read_message_id: MessageId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn server_message_serializes_with_type_tag() {
        let msg = ServerMessage::Connected(ConnectedMessage {
            connection_id: "conn-1".to_string(),
            rooms: vec![RoomId::from_raw(3)],
        });

        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({"type": "connected", "connectionId": "conn-1", "rooms": [3]})
        );
    }

    #[test]
    fn notifications_map_to_wire_events() {
        let msg = ServerMessage::from(ChatNotification::RoomAssigned {
            room_id: RoomId::from_raw(8),
        });
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"type": "roomAssigned", "roomId": 8})
        );

        let msg = ServerMessage::from(ChatNotification::UnreadCount { count: 4 });
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"type": "unreadCount", "count": 4})
        );
    }

    #[test]
    fn new_message_carries_display_payloads() {
        let msg = ServerMessage::from(ChatNotification::NewMessage {
            room_id: RoomId::from_raw(1),
            message_id: MessageId::from_raw(2),
            user_id: UserId::from_raw(3),
            text: None,
            display: vec![MessageDisplay::pick_meeting_date(
                crate::domain::foundation::ScheduleId::from_raw(9),
            )],
            created_at: Timestamp::now(),
        });

        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "newMessage");
        assert_eq!(value["messageId"], 2);
        assert_eq!(value["display"][0]["type"], "pick_meeting_date");
        assert_eq!(value["display"][0]["payload"]["scheduleId"], 9);
    }

    #[test]
    fn client_message_deserializes_join_chat() {
        let json = r#"{"type": "joinChat", "name": "Ann", "participants": 3}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            ClientMessage::JoinChat(JoinChatRequest {
                name: "Ann".into(),
                participants: 3,
                email: None,
            })
        );
    }

    #[test]
    fn client_message_deserializes_mark_read() {
        let json = r#"{"type": "markRead", "roomId": 5, "lastReadMessageId": 12}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            ClientMessage::MarkRead(MarkReadRequest {
                room_id: RoomId::from_raw(5),
                last_read_message_id: MessageId::from_raw(12),
            })
        );
    }

    #[test]
    fn client_message_deserializes_ping() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type": "ping"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));
    }

    #[test]
    fn unknown_event_is_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type": "leaveChat"}"#).is_err());
    }

    #[test]
    fn chat_error_becomes_error_event() {
        let msg = ServerMessage::from(&ChatError::Unauthenticated);
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["code"], "UNAUTHENTICATED");
    }
}
