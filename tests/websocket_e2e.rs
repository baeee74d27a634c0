//! WebSocket endpoint tests against a real listener.
//!
//! Spins up the full application router on an ephemeral port and talks to
//! it with `tokio-tungstenite`, signing tokens the same way the auth
//! service does.

use futures::{SinkExt, StreamExt};
use jsonwebtoken::{encode, EncodingKey, Header};
use secrecy::SecretString;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use classroom_hub::adapters::http::app_router;
use classroom_hub::adapters::websocket::{
    ConnectionLifecycle, ConnectionSettings, Hub, HubHandle, WebSocketState,
};
use classroom_hub::adapters::{
    HubNotifier, InMemoryChatStore, InMemoryCourseDirectory, InMemoryNotificationStore,
    JwtAuthenticator,
};
use classroom_hub::domain::course::UserProfile;
use classroom_hub::domain::foundation::{CourseId, UserId};
use classroom_hub::domain::notification::{Notification, NotificationType};

const SECRET: &str = "e2e-signing-secret-that-is-long-enough";

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

fn user(id: &str) -> UserId {
    UserId::new(id).unwrap()
}

fn course(id: &str) -> CourseId {
    CourseId::new(id).unwrap()
}

fn token_for(sub: &str) -> String {
    let exp = chrono::Utc::now().timestamp() + 3600;
    encode(
        &Header::default(),
        &serde_json::json!({ "sub": sub, "exp": exp }),
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

struct Server {
    addr: SocketAddr,
    hub: HubHandle,
}

async fn start_server() -> Server {
    let profile = |id: &str, first: &str| {
        UserProfile::new(user(id), format!("{}@example.com", id), id, first, "Tester")
    };
    let directory = Arc::new(
        InMemoryCourseDirectory::new()
            .with_user(profile("u1", "Ada"))
            .with_user(profile("u2", "Ben"))
            .with_course(course("course1"), "Algebra")
            .with_member(&course("course1"), &user("u1"))
            .with_member(&course("course1"), &user("u2")),
    );

    let (hub, _task) = Hub::spawn(64, 64);
    let notifier = Arc::new(HubNotifier::new(
        hub.clone(),
        directory.clone(),
        Arc::new(InMemoryNotificationStore::new()),
    ));
    let chat = Arc::new(InMemoryChatStore::new(directory.clone()));
    let lifecycle =
        ConnectionLifecycle::new(hub.clone(), chat, notifier, ConnectionSettings::default());
    let authenticator = Arc::new(JwtAuthenticator::new(
        &SecretString::new(SECRET.to_string()),
        0,
    ));

    let app = app_router(WebSocketState::new(authenticator, directory, lifecycle), &[]);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Server { addr, hub }
}

async fn connect(server: &Server, sub: &str) -> Socket {
    let url = format!("ws://{}/api/v1/ws?token={}", server.addr, token_for(sub));
    let (socket, _response) = connect_async(url).await.unwrap();
    socket
}

async fn wait_for_connections(hub: &HubHandle, expected: usize) {
    for _ in 0..200 {
        if hub.connection_count() == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {} connections, have {}", expected, hub.connection_count());
}

/// Next JSON text frame of the given type, skipping everything else.
async fn next_of_type(socket: &mut Socket, kind: &str) -> Value {
    tokio::time::timeout(Duration::from_secs(2), async {
        while let Some(message) = socket.next().await {
            if let Message::Text(text) = message.unwrap() {
                let value: Value = serde_json::from_str(&text).unwrap();
                if value["type"] == kind {
                    return value;
                }
            }
        }
        panic!("socket closed before a {} frame arrived", kind);
    })
    .await
    .unwrap()
}

async fn nothing_of_type(socket: &mut Socket, kind: &str) -> bool {
    let wait = tokio::time::timeout(Duration::from_millis(200), next_of_type(socket, kind));
    wait.await.is_err()
}

#[tokio::test]
async fn chat_round_trip_between_two_members() {
    let server = start_server().await;
    let mut ada = connect(&server, "u1").await;
    let mut ben = connect(&server, "u2").await;
    wait_for_connections(&server.hub, 2).await;

    ada.send(Message::Text(
        r#"{"type":"chat_message","course_id":"course1","text":"hi Ben"}"#.to_string(),
    ))
    .await
    .unwrap();

    let chat = next_of_type(&mut ben, "chat_message").await;
    assert_eq!(chat["text"], "hi Ben");
    assert_eq!(chat["sender"]["firstName"], "Ada");

    let note = next_of_type(&mut ben, "message_sent").await;
    assert_eq!(note["classId"], "course1");

    assert!(nothing_of_type(&mut ada, "chat_message").await);
}

#[tokio::test]
async fn notification_is_pushed_to_the_recipient() {
    let server = start_server().await;
    let mut ben = connect(&server, "u2").await;
    wait_for_connections(&server.hub, 1).await;

    server
        .hub
        .notify(
            Notification::new(
                NotificationType::RoleChanged,
                course("course1"),
                vec![user("u2")],
                "You are now a moderator",
            )
            .with_data(serde_json::json!({ "role": "moderator" })),
        )
        .await
        .unwrap();

    let note = next_of_type(&mut ben, "role_changed").await;
    assert_eq!(note["message"], "You are now a moderator");
    assert_eq!(note["data"]["role"], "moderator");
    assert_eq!(note["read"], false);
}

#[tokio::test]
async fn missing_token_is_rejected_before_upgrade() {
    let server = start_server().await;
    let url = format!("ws://{}/api/v1/ws", server.addr);

    match connect_async(url).await {
        Err(tungstenite::Error::Http(response)) => {
            assert_eq!(response.status(), 401);
        }
        other => panic!("expected HTTP rejection, got {:?}", other.map(|_| ())),
    }
    assert_eq!(server.hub.connection_count(), 0);
}

#[tokio::test]
async fn forged_token_is_rejected() {
    let server = start_server().await;
    let forged = encode(
        &Header::default(),
        &serde_json::json!({ "sub": "u1", "exp": chrono::Utc::now().timestamp() + 3600 }),
        &EncodingKey::from_secret(b"some-other-secret"),
    )
    .unwrap();
    let url = format!("ws://{}/api/v1/ws?token={}", server.addr, forged);

    assert!(matches!(
        connect_async(url).await,
        Err(tungstenite::Error::Http(response)) if response.status() == 401
    ));
}

#[tokio::test]
async fn client_close_unregisters_the_connection() {
    let server = start_server().await;
    let mut ada = connect(&server, "u1").await;
    let _ben = connect(&server, "u2").await;
    wait_for_connections(&server.hub, 2).await;

    ada.close(None).await.unwrap();
    wait_for_connections(&server.hub, 1).await;
}
