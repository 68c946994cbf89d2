//! HTTP handlers for chat endpoints.
//!
//! These handlers connect Axum routes to the chat application handlers.

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapters::http::middleware::{OptionalAuth, RequireAuth};
use crate::application::{
    ChatServices, CreateDirectRoomCommand, GetRoomQuery, JoinQueueCommand, ListMessagesQuery,
    ListRoomsQuery, MarkReadCommand, OpenHireRoomCommand, SendMessageCommand, UnreadCountQuery,
};
use crate::domain::chat::{Attachments, ChatError};
use crate::domain::foundation::{ConnectionId, RoomId, ValidationError};

use super::dto::{
    CreateDirectRoomRequest, DirectRoomResponse, ErrorResponse, HealthResponse, HireRoomResponse,
    JoinChatParams, JoinChatRequest, JoinChatResponse, ListMessagesParams, ListRoomsParams,
    MarkReadRequest, MessageListResponse, OpenHireRoomRequest, ReadResponse, SendMessageRequest,
    UnreadCountResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for chat routes.
#[derive(Clone)]
pub struct ChatAppState {
    pub services: ChatServices,
}

impl ChatAppState {
    pub fn new(services: ChatServices) -> Self {
        Self { services }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Matching
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/chats/join - Join the matching queue by identity
pub async fn join_chat(
    State(state): State<ChatAppState>,
    Query(params): Query<JoinChatParams>,
    Json(request): Json<JoinChatRequest>,
) -> Result<impl IntoResponse, ChatApiError> {
    let email = required(request.email, "email")?;
    let name = required(request.name, "name")?;
    let participants = request
        .requested_members
        .ok_or_else(|| ChatError::validation("requestedMembers", "requestedMembers is required"))?;
    let connection_id = params
        .connection_id
        .filter(|c| !c.trim().is_empty())
        .map(ConnectionId::new)
        .transpose()?;

    let result = state
        .services
        .join_queue
        .handle(JoinQueueCommand {
            user_id: None,
            email: Some(email),
            name,
            participants,
            connection_id,
        })
        .await?;

    Ok(Json(JoinChatResponse::from_room(result.room_id)))
}

fn required(value: Option<String>, field: &str) -> Result<String, ChatError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ChatError::validation(field, format!("{} is required", field)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Rooms
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/messages/rooms/direct - Create a direct room with an opening message
pub async fn create_direct_room(
    State(state): State<ChatAppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<CreateDirectRoomRequest>,
) -> Result<impl IntoResponse, ChatApiError> {
    let result = state
        .services
        .create_direct_room
        .handle(CreateDirectRoomCommand {
            host_id: user.id,
            other_user_id: request.user_id,
            text: request.text,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DirectRoomResponse {
            room: result.room,
            message: result.message,
        }),
    ))
}

/// POST /api/messages/rooms - Find or create the hire room with a counterpart
pub async fn open_hire_room(
    State(state): State<ChatAppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<OpenHireRoomRequest>,
) -> Result<impl IntoResponse, ChatApiError> {
    let result = state
        .services
        .open_hire_room
        .handle(OpenHireRoomCommand {
            host_id: user.id,
            counterpart_id: request.user_id,
            hire_id: request.hire_id,
            name: request.name,
        })
        .await?;

    let status = if result.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(HireRoomResponse {
            room: result.room,
            created: result.created,
        }),
    ))
}

/// GET /api/messages/rooms - Paginated rooms of the caller
pub async fn list_rooms(
    State(state): State<ChatAppState>,
    OptionalAuth(user): OptionalAuth,
    Query(params): Query<ListRoomsParams>,
) -> Result<impl IntoResponse, ChatApiError> {
    let sort = params.room_sort()?;
    let page = state
        .services
        .list_rooms
        .handle(ListRoomsQuery {
            user_id: user.map(|u| u.id),
            text: params.text,
            hire_id: params.hire_id,
            vacancy_id: params.vacancy_id,
            companion_id: params.user_id,
            sort,
            page: params.page,
            page_size: params.page_size,
        })
        .await?;

    Ok(Json(page))
}

/// GET /api/messages/rooms/:id - One room the caller belongs to
pub async fn get_room(
    State(state): State<ChatAppState>,
    RequireAuth(user): RequireAuth,
    Path(room_id): Path<i64>,
) -> Result<impl IntoResponse, ChatApiError> {
    let room = state
        .services
        .get_room
        .handle(GetRoomQuery {
            room_id: RoomId::new(room_id)?,
            user_id: user.id,
        })
        .await?;

    Ok(Json(room))
}

// ════════════════════════════════════════════════════════════════════════════════
// Messages
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/messages - Paginated messages of one room
pub async fn list_messages(
    State(state): State<ChatAppState>,
    RequireAuth(user): RequireAuth,
    Query(params): Query<ListMessagesParams>,
) -> Result<impl IntoResponse, ChatApiError> {
    let mut query = ListMessagesQuery::new(params.room_id, user.id);
    query.direction = params.direction()?;
    query.author_id = params.user_id;
    query.text = params.include_text;
    query.include_meta = params.include_meta;
    query.page = params.page;
    query.page_size = params.page_size;

    let result = state.services.list_messages.handle(query).await?;

    Ok(Json(MessageListResponse {
        messages: result.messages,
        room: result.room,
    }))
}

/// POST /api/messages - Post a message to a room
pub async fn send_message(
    State(state): State<ChatAppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ChatApiError> {
    let message = state
        .services
        .send_message
        .handle(SendMessageCommand {
            room_id: request.room_id,
            user_id: user.id,
            text: request.text,
            display: request.display,
            attachments: Attachments {
                image_name: request.image_name,
                document_name: request.document_name,
            },
        })
        .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// POST /api/messages/read - Advance the caller's read cursor
pub async fn mark_read(
    State(state): State<ChatAppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<MarkReadRequest>,
) -> Result<impl IntoResponse, ChatApiError> {
    let result = state
        .services
        .mark_read
        .handle(MarkReadCommand {
            user_id: user.id,
            room_id: request.room_id,
            last_read_message_id: request.last_read_message_id,
        })
        .await?;

    Ok(Json(ReadResponse {
        updated: result.updated,
    }))
}

/// GET /api/messages/unread-count - Unread total, zero for anonymous callers
pub async fn unread_count(
    State(state): State<ChatAppState>,
    OptionalAuth(user): OptionalAuth,
) -> Result<impl IntoResponse, ChatApiError> {
    let count = state
        .services
        .unread_count
        .handle(UnreadCountQuery {
            user_id: user.map(|u| u.id),
        })
        .await?;

    Ok(Json(UnreadCountResponse { count }))
}

/// GET /api/health
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts chat errors to HTTP responses.
#[derive(Debug)]
pub struct ChatApiError(ChatError);

impl From<ChatError> for ChatApiError {
    fn from(err: ChatError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ChatApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ChatApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            ChatError::Validation { .. } => StatusCode::BAD_REQUEST,
            ChatError::NotFound(_) => StatusCode::NOT_FOUND,
            ChatError::Conflict(_) => StatusCode::CONFLICT,
            ChatError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ChatError::Infrastructure(detail) => {
                tracing::error!(error = %detail, "Request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorResponse::new(self.0.code(), self.0.client_message());
        (status, Json(body)).into_response()
    }
}
