//! WebSocket adapters for realtime course traffic.
//!
//! This module provides the connection hub: the registry of live
//! connections and the fan-out of chat messages and notifications to them.
//!
//! # Architecture
//!
//! ```text
//!   GET /api/v1/ws?token=…
//!            │ authenticate, snapshot courses
//!            ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     ConnectionLifecycle                              │
//! │   writer task ◄── outbox ◄── Hub / heartbeat                         │
//! │   inbound loop ──► ChatPersistence ──► Hub::broadcast ──► Notifier   │
//! └─────────────────────────────────────────────────────────────────────┘
//!            │ register / unregister
//!            ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Hub router                                  │
//! │   notifications → recipients       chat → course members - author   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`connection`] - Transport-agnostic connection handle and writer task
//! - [`client`] - Registered client and routing predicates
//! - [`hub`] - Registry owner and fan-out router
//! - [`liveness`] - Ping ticker and pong read deadline
//! - [`inbound`] - Chat frame processing
//! - [`lifecycle`] - Per-connection orchestration
//! - [`messages`] - Wire format
//! - [`handler`] - Axum upgrade handler

pub mod client;
pub mod connection;
pub mod handler;
pub mod hub;
pub mod inbound;
pub mod lifecycle;
pub mod liveness;
pub mod messages;

pub use client::Client;
pub use connection::{
    Connection, ConnectionError, Frame, FrameSink, FrameStream, DEFAULT_MAX_PENDING,
    DEFAULT_WRITE_TIMEOUT,
};
pub use handler::{websocket_router, ws_handler, ConnectParams, UpgradeRejection, WebSocketState};
pub use hub::{Hub, HubError, HubHandle, DEFAULT_CHANNEL_CAPACITY};
pub use inbound::{InboundProcessor, InboundRejection};
pub use lifecycle::{ConnectionLifecycle, ConnectionSettings};
pub use liveness::{spawn_heartbeat, LivenessConfig, ReadDeadline};
pub use messages::{ChatMessageFrame, ClientFrame, NotificationFrame};
