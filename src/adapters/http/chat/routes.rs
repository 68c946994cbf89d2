//! Axum router configuration for chat endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    create_direct_room, get_room, health, join_chat, list_messages, list_rooms, mark_read,
    open_hire_room, send_message, unread_count, ChatAppState,
};

/// Create the message and room routes.
///
/// # Routes
/// - `POST /rooms/direct` - Create a direct room with an opening message
/// - `POST /rooms` - Find or create a hire room
/// - `GET /rooms` - Paginated rooms of the caller
/// - `GET /rooms/:id` - One room
/// - `GET /` - Paginated messages of a room
/// - `POST /` - Post a message
/// - `POST /read` - Advance the read cursor
/// - `GET /unread-count` - Unread total (anonymous callers get zero)
pub fn message_routes() -> Router<ChatAppState> {
    Router::new()
        .route("/", get(list_messages).post(send_message))
        .route("/read", post(mark_read))
        .route("/unread-count", get(unread_count))
        .route("/rooms", get(list_rooms).post(open_hire_room))
        .route("/rooms/direct", post(create_direct_room))
        .route("/rooms/:id", get(get_room))
}

/// Create the matching routes.
///
/// # Routes
/// - `POST /join` - Join the queue by identity (no auth)
pub fn matching_routes() -> Router<ChatAppState> {
    Router::new().route("/join", post(join_chat))
}

/// Create the complete chat router, suitable for mounting at `/api`.
pub fn chat_router() -> Router<ChatAppState> {
    Router::new()
        .nest("/messages", message_routes())
        .nest("/chats", matching_routes())
        .route("/health", get(health))
}
