//! Transport-agnostic connection handle.
//!
//! A physical connection is split in two halves:
//!
//! - the write half ([`FrameSink`]) is owned by a dedicated writer task that
//!   drains the connection's outbox, so there is only ever one concurrent
//!   writer per transport
//! - the read half ([`FrameStream`]) is owned by the inbound loop
//!
//! Everything else (hub router, heartbeat) talks to the connection through
//! the cloneable [`Connection`] handle: it enqueues frames without waiting
//! and can close the connection exactly once.
//!
//! A peer is judged slow by time, not by queue length: every write must
//! finish within the write timeout. The pending-frame limit only bounds the
//! memory a peer can pin and sits well above the hub's own channel
//! capacity. Frames accepted before a close are still written before the
//! close frame goes out.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, watch};

use crate::domain::foundation::ConnectionId;

use super::hub::HubHandle;

/// Default number of frames that may wait for a connection's writer.
pub const DEFAULT_MAX_PENDING: usize = 1024;

/// Default time a single write may take before the peer is dropped.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// How long the writer waits for the transport to take a close frame.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// A single frame exchanged with a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
    Ping(Vec<u8>),
    Pong(Vec<u8>),
    Close,
}

/// Errors raised by the connection or its transport.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("Connection is closed")]
    Closed,

    #[error("Too many frames waiting for the writer")]
    Saturated,

    #[error("Write did not complete in time")]
    WriteTimeout,

    #[error("No pong received before the read deadline")]
    DeadlineExceeded,

    #[error("Transport error: {0}")]
    Transport(String),
}

impl ConnectionError {
    /// Wrap a transport-level failure.
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Write half of a transport.
#[async_trait]
pub trait FrameSink: Send + 'static {
    /// Write one frame to the peer.
    async fn send(&mut self, frame: Frame) -> Result<(), ConnectionError>;

    /// Send a close frame and release the transport.
    async fn close(&mut self) -> Result<(), ConnectionError>;
}

/// Read half of a transport.
#[async_trait]
pub trait FrameStream: Send + 'static {
    /// Next frame from the peer, `None` once the peer has gone away.
    async fn receive(&mut self) -> Option<Result<Frame, ConnectionError>>;
}

/// Cloneable handle to one live connection.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    outbox: mpsc::UnboundedSender<Frame>,
    pending: Arc<AtomicUsize>,
    max_pending: usize,
    closed: Arc<watch::Sender<bool>>,
}

impl Connection {
    /// Start the writer task for `sink` with the default write timeout.
    pub fn open<S: FrameSink>(sink: S, max_pending: usize, hub: HubHandle) -> Self {
        Self::open_with_timeout(sink, max_pending, DEFAULT_WRITE_TIMEOUT, hub)
    }

    /// Start the writer task for `sink` and return the handle.
    ///
    /// `max_pending` bounds how many frames may wait for the writer. A write
    /// that fails or takes longer than `write_timeout` closes the connection
    /// and asks `hub` to unregister it.
    pub fn open_with_timeout<S: FrameSink>(
        sink: S,
        max_pending: usize,
        write_timeout: Duration,
        hub: HubHandle,
    ) -> Self {
        let (outbox, frames) = mpsc::unbounded_channel();
        let (closed, _) = watch::channel(false);
        let connection = Self {
            id: ConnectionId::new(),
            outbox,
            pending: Arc::new(AtomicUsize::new(0)),
            max_pending: max_pending.max(1),
            closed: Arc::new(closed),
        };

        tokio::spawn(write_loop(
            connection.clone(),
            Writer {
                sink,
                frames,
                write_timeout,
            },
            hub,
        ));

        connection
    }

    /// Identifier assigned when the connection was opened.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue a frame for the writer without waiting.
    ///
    /// Fails with `Saturated` when `max_pending` frames are already waiting
    /// and `Closed` once the connection has been closed. An accepted frame
    /// is written unless the transport fails.
    pub fn deliver(&self, frame: Frame) -> Result<(), ConnectionError> {
        if self.is_closed() {
            return Err(ConnectionError::Closed);
        }
        if self.pending.fetch_add(1, Ordering::AcqRel) >= self.max_pending {
            self.pending.fetch_sub(1, Ordering::AcqRel);
            return Err(ConnectionError::Saturated);
        }
        self.outbox.send(frame).map_err(|_| {
            self.pending.fetch_sub(1, Ordering::AcqRel);
            ConnectionError::Closed
        })
    }

    /// Frames accepted but not yet taken by the writer.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Close the connection. Returns `true` only for the call that closed it.
    pub fn close(&self) -> bool {
        self.closed.send_if_modified(|closed| {
            if *closed {
                false
            } else {
                *closed = true;
                true
            }
        })
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    /// Resolves once the connection has been closed.
    pub async fn closed(&self) {
        let mut watcher = self.closed.subscribe();
        // The sender lives in `self`, so this only ends when the flag flips.
        let _ = watcher.wait_for(|closed| *closed).await;
    }
}

struct Writer<S> {
    sink: S,
    frames: mpsc::UnboundedReceiver<Frame>,
    write_timeout: Duration,
}

impl<S: FrameSink> Writer<S> {
    async fn write(&mut self, frame: Frame) -> Result<(), ConnectionError> {
        match tokio::time::timeout(self.write_timeout, self.sink.send(frame)).await {
            Ok(written) => written,
            Err(_) => Err(ConnectionError::WriteTimeout),
        }
    }
}

async fn write_loop<S: FrameSink>(connection: Connection, mut writer: Writer<S>, hub: HubHandle) {
    let mut healthy = true;

    loop {
        let frame = tokio::select! {
            biased;
            frame = writer.frames.recv() => frame,
            _ = connection.closed() => break,
        };
        let Some(frame) = frame else { break };
        connection.pending.fetch_sub(1, Ordering::AcqRel);

        if let Err(e) = writer.write(frame).await {
            tracing::debug!(
                connection_id = %connection.id(),
                error = %e,
                "Write failed, dropping connection"
            );
            hub.disconnect(&connection);
            healthy = false;
            break;
        }
    }

    // Flush what was accepted before the close.
    writer.frames.close();
    while healthy {
        let Ok(frame) = writer.frames.try_recv() else { break };
        connection.pending.fetch_sub(1, Ordering::AcqRel);
        if let Err(e) = writer.write(frame).await {
            tracing::debug!(
                connection_id = %connection.id(),
                error = %e,
                "Flush after close abandoned"
            );
            healthy = false;
        }
    }

    match tokio::time::timeout(CLOSE_TIMEOUT, writer.sink.close()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::trace!(connection_id = %connection.id(), error = %e, "Close frame not sent");
        }
        Err(_) => {
            tracing::debug!(connection_id = %connection.id(), "Close frame timed out");
        }
    }
}
