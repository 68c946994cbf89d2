//! Integration tests for the assembled HTTP router.
//!
//! Drives `app_router` with `tower::ServiceExt::oneshot`, using the mock
//! session validator and the in-memory adapters.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use recruit_chat::adapters::auth::MockSessionValidator;
use recruit_chat::adapters::http::{app_router, AuthState, ChatAppState};
use recruit_chat::adapters::memory::{
    InMemoryChatStore, InMemoryHireDirectory, InMemoryIdentityProvider,
};
use recruit_chat::adapters::websocket::{ConnectionHub, WebSocketState};
use recruit_chat::application::{ChatPolicy, ChatPorts, ChatServices};
use recruit_chat::domain::chat::Participant;
use recruit_chat::domain::foundation::UserId;

// =============================================================================
// Test Infrastructure
// =============================================================================

const HOST_TOKEN: &str = "host-token";
const GUEST_TOKEN: &str = "guest-token";
const OUTSIDER_TOKEN: &str = "outsider-token";

fn app() -> Router {
    let store = Arc::new(InMemoryChatStore::new());
    let identities = Arc::new(InMemoryIdentityProvider::new());
    for (id, name) in [(1, "Hana"), (2, "Gus"), (3, "Olga")] {
        identities.insert(
            Participant::new(UserId::from_raw(id))
                .with_name(name)
                .with_email(format!("{}@example.com", name.to_lowercase())),
        );
    }
    let hub = Arc::new(ConnectionHub::new(16));
    let ports = ChatPorts {
        rooms: store.clone(),
        messages: store.clone(),
        queue: store.clone(),
        registry: store,
        identities,
        hires: Arc::new(InMemoryHireDirectory::new()),
        pusher: hub.clone(),
    };
    let services = ChatServices::new(ports, ChatPolicy::default());
    let validator: AuthState = Arc::new(
        MockSessionValidator::new()
            .with_test_user(HOST_TOKEN, 1)
            .with_test_user(GUEST_TOKEN, 2)
            .with_test_user(OUTSIDER_TOKEN, 3),
    );

    app_router(
        ChatAppState::new(services.clone()),
        WebSocketState::new(services, hub, validator.clone()),
        validator,
    )
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn post(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

// =============================================================================
// Health and Auth
// =============================================================================

#[tokio::test]
async fn health_is_public() {
    let app = app();
    let (status, body) = call(&app, get("/api/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn invalid_bearer_token_is_rejected() {
    let app = app();
    let (status, body) = call(&app, get("/api/health", Some("forged"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn member_routes_require_a_token() {
    let app = app();
    let (status, _) = call(&app, get("/api/messages/rooms", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(
        &app,
        post("/api/messages", None, json!({"roomId": 1, "text": "hi"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn anonymous_unread_count_is_zero() {
    let app = app();
    let (status, body) = call(&app, get("/api/messages/unread-count", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"count": 0}));
}

// =============================================================================
// Matching
// =============================================================================

#[tokio::test]
async fn join_waits_then_matches() {
    let app = app();
    let join = |email: &str, name: &str| {
        post(
            "/api/chats/join",
            None,
            json!({"email": email, "name": name, "requestedMembers": 2}),
        )
    };

    let (status, body) = call(&app, join("ann@example.com", "Ann")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "waiting for participants"}));

    let (status, body) = call(&app, join("bob@example.com", "Bob")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["roomId"].is_i64());
}

#[tokio::test]
async fn join_without_required_fields_is_bad_request() {
    let app = app();
    let (status, body) = call(
        &app,
        post("/api/chats/join", None, json!({"name": "Ann", "requestedMembers": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");

    let (status, _) = call(
        &app,
        post(
            "/api/chats/join",
            None,
            json!({"email": "ann@example.com", "name": "Ann", "requestedMembers": 1}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Rooms and Messages
// =============================================================================

#[tokio::test]
async fn direct_room_conversation_flow() {
    let app = app();

    let (status, body) = call(
        &app,
        post(
            "/api/messages/rooms/direct",
            Some(HOST_TOKEN),
            json!({"userId": 2, "text": "Hello Gus"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let room_id = body["room"]["id"].as_i64().unwrap();
    assert_eq!(body["message"]["text"], "Hello Gus");

    let (status, body) = call(
        &app,
        post(
            "/api/messages",
            Some(GUEST_TOKEN),
            json!({"roomId": room_id, "text": "Hi Hana"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["userId"], 2);

    let uri = format!("/api/messages?roomId={}&includeMeta=true", room_id);
    let (status, body) = call(&app, get(&uri, Some(HOST_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["items"][0]["text"], "Hello Gus");
    assert_eq!(body["room"]["id"], room_id);

    let (status, body) = call(&app, get("/api/messages/rooms", Some(GUEST_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["id"], room_id);
    assert!(body["items"][0]["companions"][0].get("email").is_none());
}

#[tokio::test]
async fn mark_read_updates_the_unread_count() {
    let app = app();
    let (_, body) = call(
        &app,
        post(
            "/api/messages/rooms/direct",
            Some(HOST_TOKEN),
            json!({"userId": 2, "text": "Offer attached"}),
        ),
    )
    .await;
    let room_id = body["room"]["id"].as_i64().unwrap();
    let message_id = body["message"]["id"].as_i64().unwrap();

    let (_, body) = call(&app, get("/api/messages/unread-count", Some(GUEST_TOKEN))).await;
    assert_eq!(body, json!({"count": 1}));

    let (status, body) = call(
        &app,
        post(
            "/api/messages/read",
            Some(GUEST_TOKEN),
            json!({"roomId": room_id, "lastReadMessageId": message_id}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"updated": true}));

    let (_, body) = call(&app, get("/api/messages/unread-count", Some(GUEST_TOKEN))).await;
    assert_eq!(body, json!({"count": 0}));
}

#[tokio::test]
async fn outsiders_get_not_found() {
    let app = app();
    let (_, body) = call(
        &app,
        post(
            "/api/messages/rooms/direct",
            Some(HOST_TOKEN),
            json!({"userId": 2, "text": "Private"}),
        ),
    )
    .await;
    let room_id = body["room"]["id"].as_i64().unwrap();

    let uri = format!("/api/messages/rooms/{}", room_id);
    let (status, body) = call(&app, get(&uri, Some(OUTSIDER_TOKEN))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = call(&app, get(&uri, Some(GUEST_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn hire_room_is_created_once() {
    let app = app();
    let open = || {
        post(
            "/api/messages/rooms",
            Some(HOST_TOKEN),
            json!({"userId": 2, "hireId": 5, "name": "Backend interview"}),
        )
    };

    let (status, first) = call(&app, open()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["created"], true);

    let (status, second) = call(&app, open()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["created"], false);
    assert_eq!(first["room"]["id"], second["room"]["id"]);
}
