//! WebSocket upgrade handler.
//!
//! Handles the HTTP → WebSocket upgrade:
//! 1. Authenticate the `token` query parameter
//! 2. Snapshot the user's course memberships
//! 3. Upgrade and hand the socket to [`ConnectionLifecycle`]
//!
//! Failures before the upgrade are answered with a plain HTTP error and no
//! client is ever registered.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::domain::foundation::{AuthError, CourseId, DomainError, UserId};
use crate::ports::{Authenticator, TopicMembershipResolver};

use super::connection::{ConnectionError, Frame, FrameSink, FrameStream};
use super::hub::HubHandle;
use super::lifecycle::ConnectionLifecycle;

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    pub authenticator: Arc<dyn Authenticator>,
    pub membership: Arc<dyn TopicMembershipResolver>,
    pub lifecycle: ConnectionLifecycle,
}

impl WebSocketState {
    pub fn new(
        authenticator: Arc<dyn Authenticator>,
        membership: Arc<dyn TopicMembershipResolver>,
        lifecycle: ConnectionLifecycle,
    ) -> Self {
        Self {
            authenticator,
            membership,
            lifecycle,
        }
    }

    pub fn hub(&self) -> &HubHandle {
        self.lifecycle.hub()
    }
}

/// Query parameters accepted on the upgrade request.
#[derive(Debug, Default, Deserialize)]
pub struct ConnectParams {
    pub token: Option<String>,
}

/// Why an upgrade request was refused.
#[derive(Debug)]
pub enum UpgradeRejection {
    Unauthenticated(AuthError),
    MembershipUnavailable(DomainError),
}

impl IntoResponse for UpgradeRejection {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            UpgradeRejection::Unauthenticated(e) if e.is_transient() => (
                StatusCode::SERVICE_UNAVAILABLE,
                "AUTH_UNAVAILABLE",
                "Authentication service unavailable".to_string(),
            ),
            UpgradeRejection::Unauthenticated(e) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", e.to_string())
            }
            UpgradeRejection::MembershipUnavailable(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Failed to resolve course memberships".to_string(),
            ),
        };

        (
            status,
            Json(serde_json::json!({
                "error": message,
                "code": code
            })),
        )
            .into_response()
    }
}

/// Authenticate the credential and snapshot the user's courses.
pub async fn authorize(
    state: &WebSocketState,
    token: Option<&str>,
) -> Result<(UserId, HashSet<CourseId>), UpgradeRejection> {
    let token = token
        .filter(|t| !t.is_empty())
        .ok_or(UpgradeRejection::Unauthenticated(AuthError::MissingToken))?;

    let user_id = state
        .authenticator
        .authenticate(token)
        .await
        .map_err(UpgradeRejection::Unauthenticated)?;

    let courses = state
        .membership
        .course_ids_for(&user_id)
        .await
        .map_err(UpgradeRejection::MembershipUnavailable)?;

    Ok((user_id, courses))
}

/// Handle WebSocket upgrade requests.
///
/// Route: `GET /api/v1/ws?token=<credential>`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<WebSocketState>,
) -> Response {
    let (user_id, courses) = match authorize(&state, params.token.as_deref()).await {
        Ok(authorized) => authorized,
        Err(rejection) => {
            match &rejection {
                UpgradeRejection::Unauthenticated(e) => {
                    tracing::warn!(error = %e, "WebSocket upgrade refused")
                }
                UpgradeRejection::MembershipUnavailable(e) => {
                    tracing::error!(error = %e, "Failed to resolve course memberships")
                }
            }
            return rejection.into_response();
        }
    };

    let lifecycle = state.lifecycle.clone();
    ws.on_upgrade(move |socket| async move {
        let (sink, stream) = socket.split();
        lifecycle.serve(user_id, courses, sink, stream).await;
    })
}

/// Create axum router for the WebSocket endpoint.
///
/// # Example
///
/// ```ignore
/// let app = Router::new()
///     .nest("/api/v1", websocket_router())
///     .with_state(ws_state);
/// ```
pub fn websocket_router() -> axum::Router<WebSocketState> {
    use axum::routing::get;

    axum::Router::new().route("/ws", get(ws_handler))
}

fn into_message(frame: Frame) -> Message {
    match frame {
        Frame::Text(text) => Message::Text(text),
        Frame::Binary(data) => Message::Binary(data),
        Frame::Ping(data) => Message::Ping(data),
        Frame::Pong(data) => Message::Pong(data),
        Frame::Close => Message::Close(None),
    }
}

fn from_message(message: Message) -> Frame {
    match message {
        Message::Text(text) => Frame::Text(text),
        Message::Binary(data) => Frame::Binary(data),
        Message::Ping(data) => Frame::Ping(data),
        Message::Pong(data) => Frame::Pong(data),
        Message::Close(_) => Frame::Close,
    }
}

#[async_trait]
impl FrameSink for SplitSink<WebSocket, Message> {
    async fn send(&mut self, frame: Frame) -> Result<(), ConnectionError> {
        SinkExt::send(self, into_message(frame))
            .await
            .map_err(ConnectionError::transport)
    }

    async fn close(&mut self) -> Result<(), ConnectionError> {
        SinkExt::close(self)
            .await
            .map_err(ConnectionError::transport)
    }
}

#[async_trait]
impl FrameStream for SplitStream<WebSocket> {
    async fn receive(&mut self) -> Option<Result<Frame, ConnectionError>> {
        let next = StreamExt::next(self).await?;
        Some(next.map(from_message).map_err(ConnectionError::transport))
    }
}
