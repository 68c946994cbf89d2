//! HTTP DTOs for chat endpoints.
//!
//! Request bodies and query strings are camelCase JSON. Rooms, messages and
//! participants serialize through their domain types.

use serde::{Deserialize, Serialize};

use crate::domain::chat::{Message, MessageDisplay, Room, RoomSummary};
use crate::domain::foundation::{
    HireId, MessageId, Page, RoomId, SortDirection, UserId, ValidationError, VacancyId,
};
use crate::ports::{RoomSort, RoomSortField};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to join the matching queue by identity.
///
/// Fields are optional at the wire level so a missing one answers 400 with
/// a field name instead of a body rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinChatRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub requested_members: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinChatParams {
    pub connection_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDirectRoomRequest {
    pub user_id: UserId,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenHireRoomRequest {
    pub user_id: UserId,
    #[serde(default)]
    pub hire_id: Option<HireId>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRoomsParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub text: Option<String>,
    pub hire_id: Option<HireId>,
    pub vacancy_id: Option<VacancyId>,
    /// Companion filter.
    pub user_id: Option<UserId>,
    /// `lastMessageAt` (default) or `createdAt`.
    pub sort_by: Option<String>,
    /// `asc` or `desc` (default).
    pub sort: Option<String>,
}

impl ListRoomsParams {
    pub fn room_sort(&self) -> Result<RoomSort, ValidationError> {
        let field = match self.sort_by.as_deref().map(str::trim) {
            None | Some("") | Some("lastMessageAt") => RoomSortField::LastMessageAt,
            Some("createdAt") => RoomSortField::CreatedAt,
            Some(other) => {
                return Err(ValidationError::invalid_format(
                    "sortBy",
                    format!("unknown sort field '{}'", other),
                ))
            }
        };
        let direction = match self.sort.as_deref() {
            None => SortDirection::Desc,
            Some(s) => s.parse()?,
        };
        Ok(RoomSort { field, direction })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMessagesParams {
    pub room_id: RoomId,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    /// Author filter.
    pub user_id: Option<UserId>,
    pub include_text: Option<String>,
    #[serde(default)]
    pub include_meta: bool,
    /// `asc` (default) or `desc`.
    pub sort: Option<String>,
}

impl ListMessagesParams {
    pub fn direction(&self) -> Result<SortDirection, ValidationError> {
        match self.sort.as_deref() {
            None => Ok(SortDirection::Asc),
            Some(s) => s.parse(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub room_id: RoomId,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub display: Vec<MessageDisplay>,
    #[serde(default)]
    pub image_name: Option<String>,
    #[serde(default)]
    pub document_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    pub room_id: RoomId,
    pub last_read_message_id: MessageId,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Outcome of a join: a room id when this join completed a group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JoinChatResponse {
    #[serde(rename_all = "camelCase")]
    Matched { room_id: RoomId },
    Waiting { message: String },
}

impl JoinChatResponse {
    pub fn from_room(room_id: Option<RoomId>) -> Self {
        match room_id {
            Some(room_id) => JoinChatResponse::Matched { room_id },
            None => JoinChatResponse::Waiting {
                message: "waiting for participants".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectRoomResponse {
    pub room: Room,
    pub message: Message,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HireRoomResponse {
    pub room: Room,
    pub created: bool,
}

pub type RoomListResponse = Page<RoomSummary>;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageListResponse {
    #[serde(flatten)]
    pub messages: Page<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<Room>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadResponse {
    pub updated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnreadCountResponse {
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
