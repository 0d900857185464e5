//! Consuming a remote event stream.

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::NotifierConfig;
use crate::error::{SseError, SseResult};
use crate::sse::constants::{CONTENT_TYPE_EVENT_STREAM, HEADER_ACCEPT};
use crate::sse::{Event, SseParser};
use crate::traits::{set_header, Headers};

/// Reads event streams and forwards decoded events to a channel.
///
/// # Example
///
/// ```ignore
/// use ssewire::{Notifier, NotifierConfig};
///
/// let notifier = Notifier::new(NotifierConfig::new().with_request_hook(|headers| {
///     headers.insert("Authorization".to_string(), "Bearer token".to_string());
/// }));
/// let (tx, mut rx) = tokio::sync::mpsc::channel(16);
/// tokio::spawn(async move { notifier.notify("http://localhost:8080/event", Some(tx)).await });
/// while let Some(event) = rx.recv().await {
///     println!("{:?}: {}", event.event_type, event.text());
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    config: NotifierConfig,
}

impl Notifier {
    /// Create a notifier with the given transport and request hook.
    pub fn new(config: NotifierConfig) -> Self {
        Self { config }
    }

    /// Build the request headers: the hook's, then `Accept` forced.
    fn request_headers(&self) -> Headers {
        let mut headers = Headers::new();
        if let Some(hook) = &self.config.request_hook {
            hook(&mut headers);
        }
        set_header(&mut headers, HEADER_ACCEPT, CONTENT_TYPE_EVENT_STREAM);
        headers
    }

    /// GET `uri` and send every decoded event to `events` until the stream
    /// ends.
    ///
    /// Blocks for the lifetime of the stream, so run it on its own task.
    /// Returns:
    /// - `Ok(())` at end-of-stream, after the final partial line, or once
    ///   the receiver of `events` is dropped
    /// - `Err(SseError::NilChannel)` without any request if `events` is
    ///   `None` or its receiver is already gone
    /// - `Err(SseError::Transport(_))` if the request or a body read fails
    pub async fn notify(&self, uri: &str, events: Option<mpsc::Sender<Event>>) -> SseResult<()> {
        let events = match events {
            Some(events) if !events.is_closed() => events,
            _ => return Err(SseError::NilChannel),
        };

        let result = self.forward(uri, &events).await;
        if let Err(e) = &result {
            warn!(
                uri,
                code = e.error_code(),
                category = %e.category(),
                "Event stream failed: {}",
                e
            );
        }
        result
    }

    async fn forward(&self, uri: &str, events: &mpsc::Sender<Event>) -> SseResult<()> {
        let headers = self.request_headers();
        debug!(uri, "Opening event stream");
        let mut body = self.config.client.get_stream(uri, &headers).await?;

        let mut parser = SseParser::new(uri);
        let mut delivered = 0usize;

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            for event in parser.feed(&chunk) {
                if events.send(event).await.is_err() {
                    debug!(uri, "Event receiver dropped, stopping");
                    return Ok(());
                }
                delivered += 1;
            }
        }

        if let Some(event) = parser.finish() {
            if events.send(event).await.is_ok() {
                delivered += 1;
            }
        }

        info!(uri, delivered, "Event stream ended");
        Ok(())
    }
}

/// Read `uri` with a default notifier. See [`Notifier::notify`].
pub async fn notify(uri: &str, events: Option<mpsc::Sender<Event>>) -> SseResult<()> {
    Notifier::default().notify(uri, events).await
}
