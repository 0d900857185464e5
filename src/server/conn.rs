//! Per-connection handle given to application code.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Notify;

use crate::error::{SseError, SseResult};
use crate::sse::Message;

/// Lifecycle of a connection. Moves forward only:
/// `Open → Closing → Closed` or `Open → Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    /// Accepting writes.
    Open,
    /// `close()` was called; the writer task is flushing what was queued.
    Closing,
    /// The writer task has exited. Terminal.
    Closed,
}

impl ConnState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ConnState::Open,
            1 => ConnState::Closing,
            _ => ConnState::Closed,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            ConnState::Open => 0,
            ConnState::Closing => 1,
            ConnState::Closed => 2,
        }
    }
}

/// State shared between every `Conn` clone and the writer task.
pub(crate) struct Shared {
    pub(crate) id: String,
    state: AtomicU8,
    /// Wakes the writer task on `close()`
    pub(crate) shutdown: Notify,
    /// Wakes `closed()` waiters once the writer task is done
    exited: Notify,
}

impl Shared {
    fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            state: AtomicU8::new(ConnState::Open.as_u8()),
            shutdown: Notify::new(),
            exited: Notify::new(),
        }
    }

    pub(crate) fn state(&self) -> ConnState {
        ConnState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// `Open → Closing`. Returns false if the connection had already left `Open`.
    fn begin_close(&self) -> bool {
        self.state
            .compare_exchange(
                ConnState::Open.as_u8(),
                ConnState::Closing.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Enter the terminal state. Only the writer task calls this.
    pub(crate) fn mark_closed(&self) {
        self.state.store(ConnState::Closed.as_u8(), Ordering::Release);
        self.exited.notify_waiters();
    }
}

/// A push channel to one remote peer.
///
/// Every write is queued for the connection's writer task, which frames
/// and flushes messages in the order they were queued. Clones share the
/// same queue; ordering holds per producer, not across producers.
///
/// Writes fail with [`SseError::ConnectionClosed`] once the connection has
/// left [`ConnState::Open`], whether because [`Conn::close`] was called,
/// the peer disconnected, or the transport failed.
#[derive(Clone)]
pub struct Conn {
    outbound: mpsc::Sender<Message>,
    shared: Arc<Shared>,
    write_retry_interval: Duration,
}

impl fmt::Debug for Conn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conn")
            .field("id", &self.shared.id)
            .field("state", &self.state())
            .finish()
    }
}

impl Conn {
    /// Create a handle and the receiving end of its queue.
    pub(crate) fn new(
        queue_capacity: usize,
        write_retry_interval: Duration,
    ) -> (Self, mpsc::Receiver<Message>) {
        let (outbound, rx) = mpsc::channel(queue_capacity.max(1));
        let conn = Self {
            outbound,
            shared: Arc::new(Shared::new()),
            write_retry_interval,
        };
        (conn, rx)
    }

    pub(crate) fn shared(&self) -> Arc<Shared> {
        Arc::clone(&self.shared)
    }

    /// Identifier used in log output.
    pub fn id(&self) -> &str {
        &self.shared.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnState {
        self.shared.state()
    }

    /// Whether writes are currently accepted.
    ///
    /// Advisory only: a write issued right after may still race with
    /// shutdown and fail.
    pub fn is_open(&self) -> bool {
        self.state() == ConnState::Open
    }

    /// Send raw bytes as an untyped message.
    pub async fn write(&self, payload: impl Into<Bytes>) -> SseResult<()> {
        self.send(Message::new(payload)).await
    }

    /// Send raw bytes, triggering `event_type` on the peer.
    pub async fn write_event(&self, event_type: &str, payload: impl Into<Bytes>) -> SseResult<()> {
        self.send(Message::with_event(event_type, payload)).await
    }

    /// Send a string as an untyped message.
    pub async fn write_string(&self, payload: &str) -> SseResult<()> {
        self.write(Bytes::copy_from_slice(payload.as_bytes())).await
    }

    /// Send a string, triggering `event_type` on the peer.
    pub async fn write_string_event(&self, event_type: &str, payload: &str) -> SseResult<()> {
        self.write_event(event_type, Bytes::copy_from_slice(payload.as_bytes()))
            .await
    }

    /// Send a JSON-encoded value as an untyped message.
    pub async fn write_json<T: Serialize + ?Sized>(&self, value: &T) -> SseResult<()> {
        self.write_json_event("", value).await
    }

    /// Send a JSON-encoded value, triggering `event_type` on the peer.
    ///
    /// An encoding failure is returned without touching the queue.
    pub async fn write_json_event<T: Serialize + ?Sized>(
        &self,
        event_type: &str,
        value: &T,
    ) -> SseResult<()> {
        let payload = serde_json::to_vec(value)?;
        self.write_event(event_type, payload).await
    }

    /// Send an XML-encoded value as an untyped message.
    pub async fn write_xml<T: Serialize + ?Sized>(&self, value: &T) -> SseResult<()> {
        self.write_xml_event("", value).await
    }

    /// Send an XML-encoded value, triggering `event_type` on the peer.
    ///
    /// The root element is named after the value's type. An encoding
    /// failure is returned without touching the queue.
    pub async fn write_xml_event<T: Serialize + ?Sized>(
        &self,
        event_type: &str,
        value: &T,
    ) -> SseResult<()> {
        let payload = quick_xml::se::to_string(value)
            .map_err(|e| SseError::SerializationFailed(e.to_string()))?;
        self.write_event(event_type, payload).await
    }

    /// Queue a message for the writer task.
    ///
    /// Never blocks indefinitely: while the queue is full the send is
    /// retried every `write_retry_interval` for as long as the connection
    /// stays open.
    pub async fn send(&self, message: Message) -> SseResult<()> {
        if !self.is_open() {
            return Err(SseError::ConnectionClosed);
        }

        let mut message = message;
        loop {
            match self.outbound.try_send(message) {
                Ok(()) => return Ok(()),
                Err(TrySendError::Full(returned)) => {
                    if !self.is_open() {
                        return Err(SseError::ConnectionClosed);
                    }
                    message = returned;
                    tokio::time::sleep(self.write_retry_interval).await;
                }
                Err(TrySendError::Closed(_)) => return Err(SseError::ConnectionClosed),
            }
        }
    }

    /// Ask the writer task to stop after flushing what is already queued.
    ///
    /// Idempotent: only the first call on any clone has an effect, later
    /// calls and calls after a peer disconnect are no-ops.
    pub fn close(&self) {
        if self.shared.begin_close() {
            tracing::debug!(conn_id = %self.shared.id, "Close requested");
            self.shared.shutdown.notify_one();
        }
    }

    /// Wait until the writer task has exited.
    pub async fn closed(&self) {
        loop {
            let exited = self.shared.exited.notified();
            if self.state() == ConnState::Closed {
                return;
            }
            exited.await;
        }
    }
}
