//! HTTP client trait abstraction.
//!
//! Provides a trait-based abstraction for streaming GET requests, enabling
//! dependency injection and mocking in tests.

use std::collections::HashMap;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::error::TransportError;

/// HTTP headers represented as a key-value map.
pub type Headers = HashMap<String, String>;

/// Response body delivered chunk by chunk.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// Insert `name: value`, removing any existing entry whose name matches
/// case-insensitively.
pub fn set_header(headers: &mut Headers, name: &str, value: &str) {
    headers.retain(|key, _| !key.eq_ignore_ascii_case(name));
    headers.insert(name.to_string(), value.to_string());
}

/// Trait for HTTP client operations.
///
/// Implementations include the production reqwest-based client and a mock
/// client for testing.
///
/// # Example
///
/// ```ignore
/// use ssewire::traits::{HttpClient, Headers};
///
/// async fn first_chunk<C: HttpClient>(client: &C) -> Option<Bytes> {
///     let mut body = client.get_stream("http://localhost/event", &Headers::new()).await.ok()?;
///     body.next().await?.ok()
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform a GET request and return the body as a stream.
    ///
    /// Returns `TransportError::Status` when the server answers with a
    /// non-success status.
    async fn get_stream(&self, url: &str, headers: &Headers) -> Result<ByteStream, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_header_replaces_case_insensitively() {
        let mut headers = Headers::new();
        headers.insert("accept".to_string(), "application/json".to_string());
        headers.insert("Authorization".to_string(), "Bearer t".to_string());

        set_header(&mut headers, "Accept", "text/event-stream");

        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("Accept").map(String::as_str), Some("text/event-stream"));
        assert!(!headers.contains_key("accept"));
    }
}
