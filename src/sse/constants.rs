//! Shared wire vocabulary for both ends of an SSE stream.

use std::time::Duration;

/// Content type of an event stream, used for both the response
/// `Content-Type` and the request `Accept` header.
pub const CONTENT_TYPE_EVENT_STREAM: &str = "text/event-stream";

pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_CACHE_CONTROL: &str = "Cache-Control";
pub const HEADER_CONNECTION: &str = "Connection";
pub const HEADER_ACCEPT: &str = "Accept";

pub const CACHE_CONTROL_NO_CACHE: &str = "no-cache";
pub const CONNECTION_KEEP_ALIVE: &str = "keep-alive";

/// Field name carrying the event type.
pub const FIELD_EVENT: &str = "event";
/// Field name carrying the payload.
pub const FIELD_DATA: &str = "data";
/// Field name carrying the reconnection delay in milliseconds.
pub const FIELD_RETRY: &str = "retry";

/// Separator between a field name and its value.
pub const FIELD_DELIMITER: &[u8] = b": ";

/// Body sent with the HTTP 500 when a response cannot stream.
pub const STREAMING_UNSUPPORTED_BODY: &str = "Streaming unsupported!";

/// Default capacity of a connection's outbound queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 16;

/// Default pause between enqueue attempts while the queue is full.
pub const DEFAULT_WRITE_RETRY_INTERVAL: Duration = Duration::from_millis(1);
