//! Mock streaming response for testing.
//!
//! Records everything written and flushed, and lets a test simulate a
//! peer disconnect or strip capabilities away.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::TransportError;
use crate::traits::{CloseNotify, ResponseWriter};

#[derive(Debug, Default)]
struct Recorded {
    headers: HashMap<String, String>,
    /// Bytes written but not yet flushed
    pending: Vec<u8>,
    /// Bytes the peer has received
    flushed: Vec<u8>,
    flush_count: usize,
    committed: bool,
    error_response: Option<(u16, String)>,
    close_notify_calls: usize,
    fail_with: Option<TransportError>,
    /// Flushes hang until `disconnect()`, then fail
    stall_flushes: bool,
}

/// Mock [`ResponseWriter`].
///
/// Clones share the same recording, so a test can keep one clone while the
/// upgrader takes ownership of another.
///
/// # Example
///
/// ```ignore
/// use ssewire::adapters::mock::MockResponseWriter;
///
/// let mock = MockResponseWriter::new();
/// let conn = ssewire::upgrade(mock.clone()).await?;
/// conn.write_string("hi").await?;
/// conn.close();
/// conn.closed().await;
/// assert_eq!(mock.body_string(), "data: hi\n\n");
/// ```
#[derive(Debug, Clone)]
pub struct MockResponseWriter {
    recorded: Arc<Mutex<Recorded>>,
    disconnect_tx: Arc<watch::Sender<bool>>,
    can_flush: bool,
    can_notify: bool,
}

impl Default for MockResponseWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockResponseWriter {
    /// Create a mock with both streaming capabilities.
    pub fn new() -> Self {
        let (disconnect_tx, _) = watch::channel(false);
        Self {
            recorded: Arc::new(Mutex::new(Recorded::default())),
            disconnect_tx: Arc::new(disconnect_tx),
            can_flush: true,
            can_notify: true,
        }
    }

    /// Report that flushing is unsupported.
    pub fn without_flush(mut self) -> Self {
        self.can_flush = false;
        self
    }

    /// Report that disconnects cannot be detected.
    pub fn without_close_notify(mut self) -> Self {
        self.can_notify = false;
        self
    }

    /// Make every subsequent write and flush fail with `error`.
    pub fn fail_writes(&self, error: TransportError) {
        self.recorded.lock().unwrap().fail_with = Some(error);
    }

    /// Make every subsequent flush hang until [`disconnect`](Self::disconnect),
    /// like a peer that stopped reading. The flush then fails with
    /// `TransportError::Disconnected`.
    pub fn stall_flushes(&self) {
        self.recorded.lock().unwrap().stall_flushes = true;
    }

    /// Simulate the peer going away.
    pub fn disconnect(&self) {
        self.disconnect_tx.send_replace(true);
    }

    /// Bytes flushed to the peer so far.
    pub fn body(&self) -> Vec<u8> {
        self.recorded.lock().unwrap().flushed.clone()
    }

    /// Flushed bytes as text.
    pub fn body_string(&self) -> String {
        String::from_utf8_lossy(&self.body()).into_owned()
    }

    /// Value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<String> {
        self.recorded
            .lock()
            .unwrap()
            .headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.clone())
    }

    /// All headers set before the head was committed.
    pub fn headers(&self) -> HashMap<String, String> {
        self.recorded.lock().unwrap().headers.clone()
    }

    /// Number of successful flushes.
    pub fn flush_count(&self) -> usize {
        self.recorded.lock().unwrap().flush_count
    }

    /// Whether the head has been sent.
    pub fn is_committed(&self) -> bool {
        self.recorded.lock().unwrap().committed
    }

    /// Status and body passed to `send_error`, if any.
    pub fn error_response(&self) -> Option<(u16, String)> {
        self.recorded.lock().unwrap().error_response.clone()
    }

    /// How many times `close_notify` was requested.
    pub fn close_notify_calls(&self) -> usize {
        self.recorded.lock().unwrap().close_notify_calls
    }
}

#[async_trait]
impl ResponseWriter for MockResponseWriter {
    fn set_header(&mut self, name: &str, value: &str) {
        let mut recorded = self.recorded.lock().unwrap();
        if recorded.committed {
            return;
        }
        recorded
            .headers
            .retain(|key, _| !key.eq_ignore_ascii_case(name));
        recorded.headers.insert(name.to_string(), value.to_string());
    }

    async fn write(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        let mut recorded = self.recorded.lock().unwrap();
        if let Some(err) = recorded.fail_with.clone() {
            return Err(err);
        }
        recorded.pending.extend_from_slice(buf);
        Ok(())
    }

    fn supports_flush(&self) -> bool {
        self.can_flush
    }

    async fn flush(&mut self) -> Result<(), TransportError> {
        let stalled = self.recorded.lock().unwrap().stall_flushes;
        if stalled {
            let mut rx = self.disconnect_tx.subscribe();
            while !*rx.borrow_and_update() {
                if rx.changed().await.is_err() {
                    break;
                }
            }
            return Err(TransportError::Disconnected);
        }

        let mut recorded = self.recorded.lock().unwrap();
        if let Some(err) = recorded.fail_with.clone() {
            return Err(err);
        }
        let pending = std::mem::take(&mut recorded.pending);
        recorded.flushed.extend_from_slice(&pending);
        recorded.flush_count += 1;
        recorded.committed = true;
        Ok(())
    }

    fn close_notify(&mut self) -> Option<CloseNotify> {
        self.recorded.lock().unwrap().close_notify_calls += 1;
        if !self.can_notify {
            return None;
        }

        let mut rx = self.disconnect_tx.subscribe();
        Some(Box::pin(async move {
            while !*rx.borrow_and_update() {
                if rx.changed().await.is_err() {
                    std::future::pending::<()>().await;
                }
            }
        }))
    }

    async fn send_error(&mut self, status: u16, body: &str) -> Result<(), TransportError> {
        let mut recorded = self.recorded.lock().unwrap();
        recorded.error_response = Some((status, body.to_string()));
        recorded.committed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_write_is_buffered_until_flush() {
        let mut mock = MockResponseWriter::new();
        mock.write(b"abc").await.unwrap();
        assert!(mock.body().is_empty());
        mock.flush().await.unwrap();
        assert_eq!(mock.body(), b"abc".to_vec());
        assert_eq!(mock.flush_count(), 1);
    }

    #[tokio::test]
    async fn test_headers_frozen_after_commit() {
        let mut mock = MockResponseWriter::new();
        mock.set_header("X-One", "1");
        mock.flush().await.unwrap();
        mock.set_header("X-Two", "2");
        assert_eq!(mock.header("x-one").as_deref(), Some("1"));
        assert!(mock.header("X-Two").is_none());
    }

    #[tokio::test]
    async fn test_close_notify_resolves_on_disconnect() {
        let mut mock = MockResponseWriter::new();
        let notify = mock.close_notify().unwrap();
        let observer = mock.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            observer.disconnect();
        });
        tokio::time::timeout(Duration::from_secs(1), notify)
            .await
            .expect("disconnect should be observed");
    }

    #[tokio::test]
    async fn test_stalled_flush_fails_on_disconnect() {
        let mut mock = MockResponseWriter::new();
        mock.stall_flushes();
        mock.write(b"abc").await.unwrap();

        let observer = mock.clone();
        let flush = tokio::spawn(async move { mock.flush().await });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!flush.is_finished());

        observer.disconnect();
        let result = tokio::time::timeout(Duration::from_secs(1), flush)
            .await
            .expect("flush should end on disconnect")
            .unwrap();
        assert_eq!(result, Err(TransportError::Disconnected));
        assert!(observer.body().is_empty());
    }

    #[tokio::test]
    async fn test_capabilities_can_be_removed() {
        let mut mock = MockResponseWriter::new().without_flush().without_close_notify();
        assert!(!mock.supports_flush());
        assert!(mock.close_notify().is_none());
    }
}
