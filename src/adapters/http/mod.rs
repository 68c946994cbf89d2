//! HTTP adapters - REST API implementations.
//!
//! `app_router` assembles the chat routes, the WebSocket upgrade and the
//! auth middleware under `/api`.

pub mod chat;
pub mod middleware;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::adapters::websocket::{websocket_router, WebSocketState};

pub use chat::{chat_router, ChatAppState};
pub use middleware::{auth_middleware, AuthState};

/// Build the complete application router.
///
/// # Routes
/// - `/api/chats/*`, `/api/messages/*`, `/api/health` - REST endpoints
/// - `/api/ws` - WebSocket upgrade (token in the query string)
///
/// Bearer tokens are validated for every route; handlers decide whether an
/// anonymous caller is acceptable.
pub fn app_router(chat_state: ChatAppState, ws_state: WebSocketState, validator: AuthState) -> Router {
    let api = chat_router()
        .with_state(chat_state)
        .merge(websocket_router().with_state(ws_state))
        .layer(axum::middleware::from_fn_with_state(validator, auth_middleware));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
}
