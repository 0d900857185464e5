//! Server-side transport abstraction.
//!
//! A [`ResponseWriter`] is the part of an HTTP response a stream needs:
//! headers, a body that can be written and flushed incrementally, and a
//! way to learn that the peer went away. Once a connection has been
//! upgraded, the writer task is the only code that touches it.

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;

use crate::error::TransportError;

/// Future that resolves once the peer has disconnected.
pub type CloseNotify = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Capability set of a streaming HTTP response.
///
/// # Example
///
/// ```ignore
/// use ssewire::traits::ResponseWriter;
///
/// async fn hello<W: ResponseWriter>(w: &mut W) -> Result<(), TransportError> {
///     w.set_header("Content-Type", "text/plain");
///     w.write(b"hello").await?;
///     w.flush().await
/// }
/// ```
#[async_trait]
pub trait ResponseWriter: Send + 'static {
    /// Set a response header, replacing any previous value.
    ///
    /// Has no effect once the head has been committed by a flush.
    fn set_header(&mut self, name: &str, value: &str);

    /// Append bytes to the body. They may stay buffered until [`flush`].
    ///
    /// [`flush`]: ResponseWriter::flush
    async fn write(&mut self, buf: &[u8]) -> Result<(), TransportError>;

    /// Whether [`flush`](ResponseWriter::flush) actually pushes bytes out.
    fn supports_flush(&self) -> bool;

    /// Send buffered output to the peer now. The first flush commits the
    /// status line and headers.
    async fn flush(&mut self) -> Result<(), TransportError>;

    /// Obtain a future that resolves when the peer disconnects, or `None`
    /// if this transport cannot detect disconnects.
    fn close_notify(&mut self) -> Option<CloseNotify>;

    /// Answer with a complete plain-text error response.
    async fn send_error(&mut self, status: u16, body: &str) -> Result<(), TransportError>;
}
