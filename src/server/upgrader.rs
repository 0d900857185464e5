//! Turning an HTTP response into an event stream.

use tracing::{debug, info, warn};

use super::conn::Conn;
use super::writer::run_writer;
use crate::config::UpgraderConfig;
use crate::error::{SseError, SseResult};
use crate::sse::constants::{
    CACHE_CONTROL_NO_CACHE, CONNECTION_KEEP_ALIVE, CONTENT_TYPE_EVENT_STREAM,
    HEADER_CACHE_CONTROL, HEADER_CONNECTION, HEADER_CONTENT_TYPE, STREAMING_UNSUPPORTED_BODY,
};
use crate::sse::retry_frame;
use crate::traits::ResponseWriter;

/// Upgrades responses into [`Conn`]s.
///
/// # Example
///
/// ```ignore
/// use ssewire::{Upgrader, UpgraderConfig};
///
/// let upgrader = Upgrader::new(UpgraderConfig::default().with_retry(Duration::from_secs(3)));
/// let conn = upgrader.upgrade(writer).await?;
/// conn.write_string_event("time", "12:00").await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Upgrader {
    config: UpgraderConfig,
}

impl Upgrader {
    /// Create an upgrader with the given settings.
    pub fn new(config: UpgraderConfig) -> Self {
        Self { config }
    }

    /// Settings applied to new connections.
    pub fn config(&self) -> &UpgraderConfig {
        &self.config
    }

    /// Take over `writer` and return a connection that streams into it.
    ///
    /// The response must be able to flush partial output and to report
    /// peer disconnects. If it cannot, the peer receives an HTTP 500 with a
    /// plain-text body and [`SseError::StreamingUnsupported`] is returned
    /// without starting a writer task.
    ///
    /// On success the stream headers are committed, the optional `retry:`
    /// frame is sent, and `writer` belongs to the connection's writer task.
    pub async fn upgrade<W: ResponseWriter>(&self, mut writer: W) -> SseResult<Conn> {
        let close_notify = if writer.supports_flush() {
            writer.close_notify()
        } else {
            None
        };

        let Some(close_notify) = close_notify else {
            warn!("Response cannot stream, rejecting upgrade");
            if let Err(e) = writer.send_error(500, STREAMING_UNSUPPORTED_BODY).await {
                debug!("Failed to send streaming-unsupported response: {}", e);
            }
            return Err(SseError::StreamingUnsupported);
        };

        writer.set_header(HEADER_CONTENT_TYPE, CONTENT_TYPE_EVENT_STREAM);
        writer.set_header(HEADER_CACHE_CONTROL, CACHE_CONTROL_NO_CACHE);
        writer.set_header(HEADER_CONNECTION, CONNECTION_KEEP_ALIVE);

        if let Some(frame) = self.config.retry.and_then(retry_frame) {
            writer.write(&frame).await?;
        }
        writer.flush().await?;

        let (conn, outbound) =
            Conn::new(self.config.queue_capacity, self.config.write_retry_interval);
        info!(conn_id = %conn.id(), "Upgraded response to event stream");

        tokio::spawn(run_writer(writer, outbound, conn.shared(), close_notify));

        Ok(conn)
    }
}

/// Upgrade `writer` with default settings.
///
/// See [`Upgrader::upgrade`].
pub async fn upgrade<W: ResponseWriter>(writer: W) -> SseResult<Conn> {
    Upgrader::default().upgrade(writer).await
}
