//! WebSocket adapters for the realtime chat gateway.
//!
//! Connected clients join the matching queue, post messages, read history
//! and receive fan-out notifications over one socket.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Chat handlers (Fanout)                          │
//! │   message created │ room assigned │ unread count changed             │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     │ RealtimePusher::push
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      ConnectionHub                                   │
//! │   conn-1 → mpsc    conn-2 → mpsc    conn-3 → mpsc                   │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     │ send task per socket
//!                                     ▼
//!                               WebSocket clients
//! ```
//!
//! # Components
//!
//! - [`messages`] - WebSocket message protocol types
//! - [`connections`] - Outbound channels keyed by connection id
//! - [`handler`] - Axum WebSocket upgrade handler and event dispatch

pub mod connections;
pub mod handler;
pub mod messages;

pub use connections::ConnectionHub;
pub use handler::{dispatch, websocket_router, ws_handler, SocketSession, WebSocketState};
pub use messages::{ClientMessage, ConnectedMessage, ErrorMessage, PongMessage, ServerMessage};
