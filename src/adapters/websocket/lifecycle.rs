//! Lifecycle of one authenticated connection, independent of transport.
//!
//! 1. Open the connection (starts the writer task)
//! 2. Register the client with the hub
//! 3. Start the heartbeat
//! 4. Run the inbound loop until the peer leaves or liveness fails
//! 5. Disconnect: close the connection and unregister

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::{CourseId, UserId};
use crate::ports::{ChatPersistence, Notifier};

use super::client::Client;
use super::connection::{
    Connection, FrameSink, FrameStream, DEFAULT_MAX_PENDING, DEFAULT_WRITE_TIMEOUT,
};
use super::hub::HubHandle;
use super::inbound::InboundProcessor;
use super::liveness::{spawn_heartbeat, LivenessConfig};

/// Per-connection tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Frames that may wait for the writer before deliveries are refused.
    pub max_pending: usize,
    /// A write slower than this drops the peer.
    pub write_timeout: Duration,
    pub liveness: LivenessConfig,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            max_pending: DEFAULT_MAX_PENDING,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            liveness: LivenessConfig::default(),
        }
    }
}

/// Everything needed to serve an authenticated connection.
#[derive(Clone)]
pub struct ConnectionLifecycle {
    hub: HubHandle,
    inbound: InboundProcessor,
    settings: ConnectionSettings,
}

impl ConnectionLifecycle {
    pub fn new(
        hub: HubHandle,
        chat: Arc<dyn ChatPersistence>,
        notifier: Arc<dyn Notifier>,
        settings: ConnectionSettings,
    ) -> Self {
        let inbound = InboundProcessor::new(hub.clone(), chat, notifier);
        Self {
            hub,
            inbound,
            settings,
        }
    }

    pub fn hub(&self) -> &HubHandle {
        &self.hub
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Serve `user_id` over the given transport halves until disconnect.
    pub async fn serve<K: FrameSink, S: FrameStream>(
        &self,
        user_id: UserId,
        courses: HashSet<CourseId>,
        sink: K,
        stream: S,
    ) {
        let connection = Connection::open_with_timeout(
            sink,
            self.settings.max_pending,
            self.settings.write_timeout,
            self.hub.clone(),
        );
        let client = Client::new(connection.clone(), user_id, courses);

        if let Err(e) = self.hub.register(client.clone()) {
            tracing::warn!(
                connection_id = %client.id(),
                user_id = %client.user_id(),
                error = %e,
                "Hub unavailable, refusing connection"
            );
            connection.close();
            return;
        }

        tracing::info!(
            connection_id = %client.id(),
            user_id = %client.user_id(),
            courses = client.courses().len(),
            "WebSocket connection established"
        );

        let heartbeat = spawn_heartbeat(
            connection.clone(),
            self.settings.liveness.ping_interval,
            self.hub.clone(),
        );

        match self
            .inbound
            .run(&client, stream, self.settings.liveness.pong_wait)
            .await
        {
            Ok(()) => tracing::info!(
                connection_id = %client.id(),
                user_id = %client.user_id(),
                "WebSocket connection closed"
            ),
            Err(e) => tracing::info!(
                connection_id = %client.id(),
                user_id = %client.user_id(),
                reason = %e,
                "WebSocket connection dropped"
            ),
        }

        self.hub.disconnect(&connection);
        heartbeat.abort();
    }
}
