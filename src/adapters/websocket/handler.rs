//! WebSocket upgrade handler for the realtime chat gateway.
//!
//! Handles the HTTP → WebSocket upgrade and manages the connection lifecycle:
//! 1. Validate the optional `token` query parameter
//! 2. Upgrade to WebSocket and register an outbound channel
//! 3. Bind the user's memberships to the new connection
//! 4. Dispatch client events until disconnect
//! 5. Release bindings and waiting queue entries

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::application::{
    ChatServices, JoinQueueCommand, MarkReadCommand, RoomHistoryQuery, SendMessageCommand,
};
use crate::domain::chat::{Attachments, ChatError};
use crate::domain::foundation::{AuthError, ConnectionId, UserId};
use crate::ports::SessionValidator;

use super::{
    connections::ConnectionHub,
    messages::{
        ClientMessage, ConnectedMessage, HistoryEntry, JoinChatRequest, ReadAckMessage,
        RoomHistoryMessage, ServerMessage,
    },
};

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    pub services: ChatServices,
    pub hub: Arc<ConnectionHub>,
    pub validator: Arc<dyn SessionValidator>,
}

impl WebSocketState {
    pub fn new(
        services: ChatServices,
        hub: Arc<ConnectionHub>,
        validator: Arc<dyn SessionValidator>,
    ) -> Self {
        Self {
            services,
            hub,
            validator,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    #[serde(default)]
    pub token: Option<String>,
}

/// Per-connection state owned by the receive loop.
#[derive(Debug, Clone)]
pub struct SocketSession {
    pub connection_id: ConnectionId,
    /// Known from the token, or adopted from the first `joinChat`.
    pub user_id: Option<UserId>,
}

impl SocketSession {
    pub fn new(connection_id: ConnectionId, user_id: Option<UserId>) -> Self {
        Self {
            connection_id,
            user_id,
        }
    }
}

/// Handle WebSocket upgrade requests.
///
/// Route: `GET /api/ws?token=<jwt>`
///
/// The token is optional. Without one the connection is anonymous until its
/// first `joinChat`. A token that fails validation is refused before upgrade.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<WebSocketState>,
) -> Response {
    let token = params
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let user_id = match token {
        None => None,
        Some(token) => match state.validator.validate(token).await {
            Ok(user) => Some(user.id),
            Err(e) => return reject_upgrade(&e),
        },
    };

    ws.on_upgrade(move |socket| handle_socket(socket, user_id, state))
}

fn reject_upgrade(err: &AuthError) -> Response {
    let status = match err {
        AuthError::ServiceUnavailable(msg) => {
            tracing::error!("Auth service unavailable: {}", msg);
            StatusCode::SERVICE_UNAVAILABLE
        }
        _ => StatusCode::UNAUTHORIZED,
    };
    (
        status,
        Json(serde_json::json!({
            "code": "UNAUTHENTICATED",
            "message": err.to_string()
        })),
    )
        .into_response()
}

/// Handle an established WebSocket connection.
///
/// Runs for the lifetime of the connection: a send task drains the hub
/// channel into the socket while the receive loop dispatches client events.
async fn handle_socket(socket: WebSocket, user_id: Option<UserId>, state: WebSocketState) {
    let (mut sender, mut receiver) = socket.split();
    let (connection_id, mut outbound) = state.hub.register().await;

    let rooms = match user_id {
        Some(user_id) => state
            .services
            .connect
            .handle(user_id, &connection_id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(
                    connection_id = %connection_id,
                    error = %e,
                    "Failed to bind memberships on connect"
                );
                Vec::new()
            }),
        None => Vec::new(),
    };

    let connected = ServerMessage::Connected(ConnectedMessage {
        connection_id: connection_id.to_string(),
        rooms,
    });

    if let Err(e) = send_message(&mut sender, &connected).await {
        tracing::debug!("Failed to send connected message: {}", e);
        release(&state, &connection_id).await;
        return;
    }

    // Forward hub traffic to the client
    let mut send_task = {
        let connection_id = connection_id.clone();
        tokio::spawn(async move {
            while let Some(msg) = outbound.recv().await {
                if let Err(e) = send_message(&mut sender, &msg).await {
                    tracing::debug!(
                        connection_id = %connection_id,
                        "Send error, closing connection: {}",
                        e
                    );
                    break;
                }
            }
        })
    };

    // Handle incoming messages from client
    let mut recv_task = {
        let state = state.clone();
        let mut session = SocketSession::new(connection_id.clone(), user_id);
        tokio::spawn(async move {
            while let Some(result) = receiver.next().await {
                match result {
                    Ok(Message::Text(text)) => {
                        let reply = match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(msg) => dispatch(&state.services, &mut session, msg).await,
                            Err(e) => {
                                tracing::debug!(
                                    connection_id = %session.connection_id,
                                    "Malformed client message: {}",
                                    e
                                );
                                Some(ServerMessage::error("VALIDATION_FAILED", "Malformed message"))
                            }
                        };
                        if let Some(reply) = reply {
                            if let Err(e) = state.hub.send(&session.connection_id, reply).await {
                                tracing::debug!("Reply dropped: {}", e);
                            }
                        }
                    }
                    Ok(Message::Binary(_)) => {
                        tracing::warn!(
                            connection_id = %session.connection_id,
                            "Received unsupported binary message"
                        );
                    }
                    Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                        // Protocol-level heartbeats are answered by axum
                    }
                    Ok(Message::Close(_)) => {
                        tracing::debug!(
                            connection_id = %session.connection_id,
                            "Client sent close frame"
                        );
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(
                            connection_id = %session.connection_id,
                            "Receive error: {}",
                            e
                        );
                        break;
                    }
                }
            }
        })
    };

    // Wait for either task to finish
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    release(&state, &connection_id).await;
}

/// Drops the connection from the hub and releases its bindings.
async fn release(state: &WebSocketState, connection_id: &ConnectionId) {
    state.hub.remove(connection_id).await;
    match state.services.disconnect.handle(connection_id).await {
        Ok(result) => tracing::info!(
            connection_id = %connection_id,
            memberships_released = result.memberships_released,
            entries_dequeued = result.entries_dequeued,
            "Connection closed"
        ),
        Err(e) => tracing::error!(
            connection_id = %connection_id,
            error = %e,
            "Failed to release connection"
        ),
    }
}

/// Runs one client event and returns the direct reply, if the event has one.
///
/// Notifications triggered by the event (new messages, room assignment,
/// unread counts) travel through the fan-out path, not through this reply.
pub async fn dispatch(
    services: &ChatServices,
    session: &mut SocketSession,
    message: ClientMessage,
) -> Option<ServerMessage> {
    let result = match message {
        ClientMessage::Ping => return Some(ServerMessage::pong()),
        ClientMessage::JoinChat(request) => join_chat(services, session, request).await,
        other => match session.user_id {
            Some(user_id) => member_event(services, user_id, other).await,
            None => Err(ChatError::Unauthenticated),
        },
    };

    result.unwrap_or_else(|e| {
        if matches!(e, ChatError::Infrastructure(_)) {
            tracing::error!(connection_id = %session.connection_id, error = %e, "Event failed");
        }
        Some(ServerMessage::from(&e))
    })
}

async fn member_event(
    services: &ChatServices,
    user_id: UserId,
    message: ClientMessage,
) -> Result<Option<ServerMessage>, ChatError> {
    match message {
        ClientMessage::SendMessage(request) => {
            let cmd = SendMessageCommand {
                room_id: request.room_id,
                user_id,
                text: request.text,
                display: request.display,
                attachments: Attachments::default(),
            };
            services.send_message.handle(cmd).await?;
            Ok(None)
        }
        ClientMessage::GetRoomHistory(request) => {
            let query = RoomHistoryQuery {
                room_id: request.room_id,
                user_id,
            };
            let messages = services.room_history.handle(query).await?;
            Ok(Some(ServerMessage::RoomHistory(RoomHistoryMessage {
                room_id: request.room_id,
                messages: messages.iter().map(HistoryEntry::from).collect(),
            })))
        }
        ClientMessage::MarkRead(request) => {
            let cmd = MarkReadCommand {
                user_id,
                room_id: request.room_id,
                last_read_message_id: request.last_read_message_id,
            };
            let result = services.mark_read.handle(cmd).await?;
            Ok(Some(ServerMessage::ReadAck(ReadAckMessage {
                room_id: request.room_id,
                updated: result.updated,
            })))
        }
        ClientMessage::Ping => Ok(Some(ServerMessage::pong())),
        ClientMessage::JoinChat(_) => Ok(None),
    }
}

async fn join_chat(
    services: &ChatServices,
    session: &mut SocketSession,
    request: JoinChatRequest,
) -> Result<Option<ServerMessage>, ChatError> {
    let result = services
        .join_queue
        .handle(JoinQueueCommand {
            user_id: session.user_id,
            email: request.email,
            name: request.name,
            participants: request.participants,
            connection_id: Some(session.connection_id.clone()),
        })
        .await?;

    if session.user_id.is_none() {
        let user_id = result.participant.id;
        session.user_id = Some(user_id);
        services.connect.handle(user_id, &session.connection_id).await?;
        tracing::debug!(
            connection_id = %session.connection_id,
            user_id = %user_id,
            "Connection adopted identity"
        );
    }

    Ok(None)
}

/// Send a JSON message over the WebSocket.
async fn send_message(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> Result<(), axum::Error> {
    match serde_json::to_string(msg) {
        Ok(json) => sender.send(Message::Text(json)).await,
        Err(e) => {
            tracing::error!("Failed to serialize server message: {}", e);
            Ok(())
        }
    }
}

/// Create axum router for the WebSocket endpoint.
pub fn websocket_router() -> axum::Router<WebSocketState> {
    use axum::routing::get;

    axum::Router::new().route("/ws", get(ws_handler))
}
