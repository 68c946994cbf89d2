//! HTTP adapter for chat endpoints.
//!
//! Exposes matching, rooms and messages via REST API:
//! - `POST /api/chats/join` - Join the matching queue by identity
//! - `POST /api/messages/rooms/direct` - Create a direct room
//! - `POST /api/messages/rooms` - Find or create a hire room
//! - `GET /api/messages/rooms` - List the caller's rooms
//! - `GET /api/messages/rooms/:id` - Get one room
//! - `GET /api/messages` - List messages of a room
//! - `POST /api/messages` - Post a message
//! - `POST /api/messages/read` - Mark messages read
//! - `GET /api/messages/unread-count` - Unread total
//! - `GET /api/health` - Liveness

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::{ChatApiError, ChatAppState};
pub use routes::{chat_router, matching_routes, message_routes};
