//! Liveness monitoring: server pings and the pong read deadline.
//!
//! Each connection gets a heartbeat task that enqueues a ping every
//! `ping_interval`. The inbound loop reads under a [`ReadDeadline`] that is
//! pushed out by `pong_wait` whenever a pong arrives. A peer that stops
//! answering pings hits the deadline and is dropped.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::connection::{Connection, ConnectionError, Frame, FrameStream};
use super::hub::HubHandle;

/// Default interval between server pings.
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(30);

/// Default time allowed for a pong before the connection is considered dead.
pub const DEFAULT_PONG_WAIT: Duration = Duration::from_secs(60);

/// Heartbeat timing for one connection.
///
/// `ping_interval` must be shorter than `pong_wait`, otherwise healthy
/// peers time out between pings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LivenessConfig {
    pub ping_interval: Duration,
    pub pong_wait: Duration,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            ping_interval: DEFAULT_PING_INTERVAL,
            pong_wait: DEFAULT_PONG_WAIT,
        }
    }
}

/// Start the ping ticker for `connection`.
///
/// The first ping goes out one interval after the start. The task ends when
/// the connection closes, or after a failed enqueue, which also disconnects
/// the client.
pub fn spawn_heartbeat(
    connection: Connection,
    ping_interval: Duration,
    hub: HubHandle,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + ping_interval, ping_interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = connection.deliver(Frame::Ping(Vec::new())) {
                        tracing::debug!(
                            connection_id = %connection.id(),
                            error = %e,
                            "Ping failed, dropping connection"
                        );
                        hub.disconnect(&connection);
                        return;
                    }
                }
                _ = connection.closed() => return,
            }
        }
    })
}

/// Deadline for the next successful read.
///
/// Only pongs extend it. Chat traffic alone does not keep a connection
/// alive.
#[derive(Debug, Clone, Copy)]
pub struct ReadDeadline {
    pong_wait: Duration,
    deadline: Instant,
}

impl ReadDeadline {
    /// Deadline `pong_wait` from now.
    pub fn new(pong_wait: Duration) -> Self {
        Self {
            pong_wait,
            deadline: Instant::now() + pong_wait,
        }
    }

    /// A pong arrived: push the deadline out to `now + pong_wait`.
    pub fn on_pong(&mut self) {
        self.deadline = Instant::now() + self.pong_wait;
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Read the next frame, failing with `DeadlineExceeded` once the
    /// deadline passes.
    pub async fn read<S: FrameStream>(
        &self,
        stream: &mut S,
    ) -> Option<Result<Frame, ConnectionError>> {
        match tokio::time::timeout_at(self.deadline, stream.receive()).await {
            Ok(next) => next,
            Err(_) => Some(Err(ConnectionError::DeadlineExceeded)),
        }
    }
}
