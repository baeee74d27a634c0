//! Connection hub: registry of live clients and fan-out of events.
//!
//! # Architecture
//!
//! ```text
//!  HubHandle (cloned everywhere)
//!     │ register ──────┐ (unbounded)
//!     │ unregister ────┤ (unbounded)
//!     │ notify ────────┤ (bounded)
//!     │ broadcast ─────┤ (bounded)
//!     ▼                ▼
//!  ┌──────────────────────────────┐
//!  │ Hub router task              │   owns HashMap<ConnectionId, Client>
//!  │   select! over the channels  │
//!  └──────────────────────────────┘
//!     │ try_send serialized frame
//!     ▼
//!  per-connection outbox ──► writer task ──► transport
//! ```
//!
//! The router is the only task that touches the registry, so mutations and
//! fan-out scans never interleave. Delivery to a client is a non-blocking
//! enqueue into its outbox, so a slow peer never stalls delivery to anyone
//! else. Its writer drops it once a write exceeds the write timeout.
//!
//! Events already queued when [`HubHandle::shutdown`] is called are
//! dispatched before the router stops.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::domain::chat::ChatMessage;
use crate::domain::foundation::ConnectionId;
use crate::domain::notification::Notification;

use super::client::Client;
use super::connection::{Connection, Frame};
use super::messages::{ChatMessageFrame, NotificationFrame};

/// Default capacity of the notification and chat channels.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Errors from submitting work to the hub.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum HubError {
    #[error("Hub is not running")]
    Closed,

    #[error("Hub channel is full")]
    Full,
}

impl<T> From<mpsc::error::SendError<T>> for HubError {
    fn from(_: mpsc::error::SendError<T>) -> Self {
        HubError::Closed
    }
}

impl<T> From<mpsc::error::TrySendError<T>> for HubError {
    fn from(err: mpsc::error::TrySendError<T>) -> Self {
        match err {
            mpsc::error::TrySendError::Full(_) => HubError::Full,
            mpsc::error::TrySendError::Closed(_) => HubError::Closed,
        }
    }
}

/// Cloneable front door to the hub router.
#[derive(Debug, Clone)]
pub struct HubHandle {
    register: mpsc::UnboundedSender<Client>,
    unregister: mpsc::UnboundedSender<ConnectionId>,
    notify: mpsc::Sender<Notification>,
    chat: mpsc::Sender<ChatMessage>,
    shutdown: Arc<watch::Sender<bool>>,
    connections: Arc<AtomicUsize>,
}

impl HubHandle {
    /// Add a client to the registry. Never blocks.
    pub fn register(&self, client: Client) -> Result<(), HubError> {
        self.register.send(client).map_err(HubError::from)
    }

    /// Remove a connection from the registry and close it. Never blocks.
    ///
    /// Unknown or already removed ids are ignored.
    pub fn unregister(&self, connection_id: ConnectionId) {
        if self.unregister.send(connection_id).is_err() {
            tracing::trace!(%connection_id, "Hub stopped, unregister ignored");
        }
    }

    /// Close `connection` now and have the router forget it.
    ///
    /// Closing first means a registration still in flight for the same
    /// connection is discarded when the router gets to it.
    pub fn disconnect(&self, connection: &Connection) {
        connection.close();
        self.unregister(connection.id());
    }

    /// Queue a notification, waiting while the channel is full.
    pub async fn notify(&self, notification: Notification) -> Result<(), HubError> {
        self.notify.send(notification).await.map_err(HubError::from)
    }

    /// Queue a notification, failing with [`HubError::Full`] instead of
    /// waiting.
    pub fn try_notify(&self, notification: Notification) -> Result<(), HubError> {
        self.notify.try_send(notification).map_err(HubError::from)
    }

    /// Queue a persisted chat message, waiting while the channel is full.
    pub async fn broadcast(&self, message: ChatMessage) -> Result<(), HubError> {
        self.chat.send(message).await.map_err(HubError::from)
    }

    /// Queue a persisted chat message without waiting.
    pub fn try_broadcast(&self, message: ChatMessage) -> Result<(), HubError> {
        self.chat.try_send(message).map_err(HubError::from)
    }

    /// Stop the router. Every registered connection is closed.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Number of registered connections as of the router's last mutation.
    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::Acquire)
    }
}

/// The router. Owns the registry and the receiving ends of every channel.
pub struct Hub {
    clients: HashMap<ConnectionId, Client>,
    register_rx: mpsc::UnboundedReceiver<Client>,
    unregister_rx: mpsc::UnboundedReceiver<ConnectionId>,
    notify_rx: mpsc::Receiver<Notification>,
    chat_rx: mpsc::Receiver<ChatMessage>,
    shutdown_rx: watch::Receiver<bool>,
    /// Loopback for dropping clients whose delivery failed mid-scan.
    unregister_tx: mpsc::UnboundedSender<ConnectionId>,
    connections: Arc<AtomicUsize>,
}

impl Hub {
    /// Create a router and its handle.
    ///
    /// # Arguments
    ///
    /// * `notify_capacity` - Notifications that may wait for the router
    /// * `chat_capacity` - Chat messages that may wait for the router
    pub fn new(notify_capacity: usize, chat_capacity: usize) -> (Self, HubHandle) {
        let (register_tx, register_rx) = mpsc::unbounded_channel();
        let (unregister_tx, unregister_rx) = mpsc::unbounded_channel();
        let (notify_tx, notify_rx) = mpsc::channel(notify_capacity.max(1));
        let (chat_tx, chat_rx) = mpsc::channel(chat_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let connections = Arc::new(AtomicUsize::new(0));

        let handle = HubHandle {
            register: register_tx,
            unregister: unregister_tx.clone(),
            notify: notify_tx,
            chat: chat_tx,
            shutdown: Arc::new(shutdown_tx),
            connections: connections.clone(),
        };

        let hub = Self {
            clients: HashMap::new(),
            register_rx,
            unregister_rx,
            notify_rx,
            chat_rx,
            shutdown_rx,
            unregister_tx,
            connections,
        };

        (hub, handle)
    }

    /// Create with the default channel capacities.
    pub fn with_default_capacity() -> (Self, HubHandle) {
        Self::new(DEFAULT_CHANNEL_CAPACITY, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a router and run it on a new task.
    pub fn spawn(notify_capacity: usize, chat_capacity: usize) -> (HubHandle, JoinHandle<()>) {
        let (hub, handle) = Self::new(notify_capacity, chat_capacity);
        (handle, tokio::spawn(hub.run()))
    }

    /// Process registry changes and events until shutdown.
    ///
    /// Also stops once every [`HubHandle`] has been dropped.
    pub async fn run(mut self) {
        tracing::info!("Connection hub started");

        loop {
            tokio::select! {
                biased;
                Some(client) = self.register_rx.recv() => self.register(client),
                Some(connection_id) = self.unregister_rx.recv() => self.unregister(connection_id),
                Some(notification) = self.notify_rx.recv() => self.dispatch_notification(&notification),
                Some(message) = self.chat_rx.recv() => self.dispatch_chat(&message),
                _ = self.shutdown_rx.changed() => break,
                else => break,
            }
        }

        self.close_all();
        tracing::info!("Connection hub stopped");
    }

    fn register(&mut self, client: Client) {
        if client.connection().is_closed() {
            tracing::debug!(
                connection_id = %client.id(),
                user_id = %client.user_id(),
                "Connection closed before registration, skipping"
            );
            return;
        }

        let connection_id = client.id();
        let user_id = client.user_id().clone();
        self.clients.insert(connection_id, client);
        self.publish_count();

        tracing::info!(
            %connection_id,
            %user_id,
            connections = self.clients.len(),
            "Client registered"
        );
    }

    fn unregister(&mut self, connection_id: ConnectionId) {
        let Some(client) = self.clients.remove(&connection_id) else {
            return;
        };
        client.connection().close();
        self.publish_count();

        tracing::info!(
            %connection_id,
            user_id = %client.user_id(),
            connections = self.clients.len(),
            "Client unregistered"
        );
    }

    fn dispatch_notification(&self, notification: &Notification) {
        let payload = match serde_json::to_string(&NotificationFrame::from(notification)) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize notification");
                return;
            }
        };

        let delivered = self.fan_out(&payload, |client| client.wants_notification(notification));

        tracing::debug!(
            notification_type = %notification.notification_type,
            course_id = %notification.course_id,
            recipients = notification.recipient_ids.len(),
            delivered,
            "Notification dispatched"
        );
    }

    fn dispatch_chat(&self, message: &ChatMessage) {
        let payload = match serde_json::to_string(&ChatMessageFrame::from(message)) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize chat message");
                return;
            }
        };

        let delivered = self.fan_out(&payload, |client| client.wants_chat(message));

        tracing::debug!(
            course_id = %message.course_id,
            from_id = %message.from_id,
            delivered,
            "Chat message dispatched"
        );
    }

    /// Enqueue `payload` for every matching client.
    ///
    /// A failed enqueue schedules an unregister instead of mutating the
    /// registry mid-scan. Returns how many clients accepted the frame.
    fn fan_out(&self, payload: &str, matches: impl Fn(&Client) -> bool) -> usize {
        let mut delivered = 0;

        for client in self.clients.values().filter(|client| matches(client)) {
            match client.connection().deliver(Frame::Text(payload.to_owned())) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        connection_id = %client.id(),
                        user_id = %client.user_id(),
                        error = %e,
                        "Delivery failed, dropping client"
                    );
                    // The router holds the receiver, so this cannot fail.
                    let _ = self.unregister_tx.send(client.id());
                }
            }
        }

        delivered
    }

    fn close_all(&mut self) {
        for (_, client) in self.clients.drain() {
            client.connection().close();
        }
        self.publish_count();
    }

    fn publish_count(&self) {
        self.connections.store(self.clients.len(), Ordering::Release);
    }
}
