//! Axum adapter: a [`ResponseWriter`] backed by a streaming body.
//!
//! The handler returns a [`PendingResponse`], which resolves as soon as
//! the writer commits the head (first flush or `send_error`). Body chunks
//! flow through a bounded channel into [`Body::from_stream`]. When axum
//! drops the body because the client went away, the channel closes and
//! the close-notify future resolves.
//!
//! ```ignore
//! async fn events() -> Response {
//!     let (writer, response) = AxumResponseWriter::new();
//!     tokio::spawn(async move {
//!         let Ok(conn) = ssewire::upgrade(writer).await else { return };
//!         while conn.write_string("tick").await.is_ok() {
//!             tokio::time::sleep(Duration::from_secs(1)).await;
//!         }
//!     });
//!     response.await
//! }
//! ```

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::{Bytes, BytesMut};
use tokio::sync::{mpsc, oneshot};

use crate::error::TransportError;
use crate::traits::{CloseNotify, ResponseWriter};

/// Number of flushed chunks that may wait for the client before `flush`
/// applies backpressure.
const BODY_CHANNEL_CAPACITY: usize = 8;

/// Streaming response writer for axum handlers.
pub struct AxumResponseWriter {
    headers: HeaderMap,
    /// Taken when the head is committed
    head_tx: Option<oneshot::Sender<Response>>,
    /// Moved into the response body on commit
    body_rx: Option<mpsc::Receiver<Bytes>>,
    body_tx: mpsc::Sender<Bytes>,
    pending: BytesMut,
}

/// The response an axum handler should return. Resolves when the writer
/// commits the head, or with HTTP 500 if the writer is dropped first.
pub struct PendingResponse {
    head_rx: oneshot::Receiver<Response>,
}

impl AxumResponseWriter {
    /// Create a writer and the response future its handler returns.
    pub fn new() -> (Self, PendingResponse) {
        let (head_tx, head_rx) = oneshot::channel();
        let (body_tx, body_rx) = mpsc::channel(BODY_CHANNEL_CAPACITY);
        let writer = Self {
            headers: HeaderMap::new(),
            head_tx: Some(head_tx),
            body_rx: Some(body_rx),
            body_tx,
            pending: BytesMut::new(),
        };
        (writer, PendingResponse { head_rx })
    }

    fn is_committed(&self) -> bool {
        self.head_tx.is_none()
    }

    fn commit(&mut self) -> Result<(), TransportError> {
        let (Some(head_tx), Some(body_rx)) = (self.head_tx.take(), self.body_rx.take()) else {
            return Ok(());
        };

        let body = Body::from_stream(futures::stream::unfold(body_rx, |mut rx| async move {
            rx.recv()
                .await
                .map(|chunk| (Ok::<_, Infallible>(chunk), rx))
        }));

        let mut response = Response::new(body);
        *response.headers_mut() = std::mem::take(&mut self.headers);

        head_tx
            .send(response)
            .map_err(|_| TransportError::Disconnected)
    }
}

#[async_trait]
impl ResponseWriter for AxumResponseWriter {
    fn set_header(&mut self, name: &str, value: &str) {
        if self.is_committed() {
            tracing::debug!("Ignoring header {} set after commit", name);
            return;
        }
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => tracing::warn!("Ignoring invalid header {}: {}", name, value),
        }
    }

    async fn write(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        if self.body_tx.is_closed() {
            return Err(TransportError::Disconnected);
        }
        self.pending.extend_from_slice(buf);
        Ok(())
    }

    fn supports_flush(&self) -> bool {
        true
    }

    async fn flush(&mut self) -> Result<(), TransportError> {
        self.commit()?;
        if self.pending.is_empty() {
            return Ok(());
        }
        let chunk = self.pending.split().freeze();
        self.body_tx
            .send(chunk)
            .await
            .map_err(|_| TransportError::Disconnected)
    }

    fn close_notify(&mut self) -> Option<CloseNotify> {
        let body_tx = self.body_tx.clone();
        Some(Box::pin(async move { body_tx.closed().await }))
    }

    async fn send_error(&mut self, status: u16, body: &str) -> Result<(), TransportError> {
        let head_tx = self
            .head_tx
            .take()
            .ok_or_else(|| TransportError::Other("response already committed".to_string()))?;
        self.body_rx = None;

        let status =
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let response = (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("{}\n", body),
        )
            .into_response();

        head_tx
            .send(response)
            .map_err(|_| TransportError::Disconnected)
    }
}

impl Future for PendingResponse {
    type Output = Response;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.head_rx)
            .poll(cx)
            .map(|result| result.unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn test_flush_commits_head_and_streams_body() {
        let (mut writer, pending) = AxumResponseWriter::new();
        writer.set_header("Content-Type", "text/event-stream");
        writer.write(b"data: a\n\n").await.unwrap();
        writer.flush().await.unwrap();

        let response = pending.await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/event-stream"
        );

        let mut body = response.into_body().into_data_stream();
        assert_eq!(body.next().await.unwrap().unwrap(), Bytes::from("data: a\n\n"));
    }

    #[tokio::test]
    async fn test_send_error_response() {
        let (mut writer, pending) = AxumResponseWriter::new();
        writer.send_error(500, "Streaming unsupported!").await.unwrap();

        let response = pending.await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"Streaming unsupported!\n");

        assert!(writer.send_error(500, "again").await.is_err());
    }

    #[tokio::test]
    async fn test_dropping_body_triggers_close_notify() {
        let (mut writer, pending) = AxumResponseWriter::new();
        let notify = writer.close_notify().unwrap();
        writer.flush().await.unwrap();

        drop(pending.await);
        tokio::time::timeout(std::time::Duration::from_secs(1), notify)
            .await
            .expect("dropping the body should close the channel");
        assert_eq!(
            writer.write(b"late").await,
            Err(TransportError::Disconnected)
        );
    }

    #[tokio::test]
    async fn test_dropped_writer_yields_500() {
        let (writer, pending) = AxumResponseWriter::new();
        drop(writer);
        assert_eq!(pending.await.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
