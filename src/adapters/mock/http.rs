//! Scripted [`HttpClient`] for notifier tests.
//!
//! Each URL maps to a script of body chunks. Every call is logged so a test
//! can inspect the headers sent, or check that nothing was sent at all.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;

use crate::error::TransportError;
use crate::traits::{ByteStream, Headers, HttpClient};

/// One `get_stream` call as the mock saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: Headers,
}

/// What the mock does when a URL is opened.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Yield these chunks, then end cleanly
    Stream(Vec<Bytes>),
    /// Yield these chunks, then fail the next read
    StreamThenError(Vec<Bytes>, TransportError),
    /// Fail before any body is available
    Error(TransportError),
}

/// ```ignore
/// let client = MockHttpClient::new();
/// client.set_response(
///     "http://localhost/event",
///     MockResponse::Stream(vec![Bytes::from("data: hi\n\n")]),
/// );
/// let notifier = Notifier::new(NotifierConfig::new().with_client(Arc::new(client.clone())));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    scripts: Arc<Mutex<HashMap<String, MockResponse>>>,
    log: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the response for an exact URL. Replaces any earlier script.
    pub fn set_response(&self, url: &str, response: MockResponse) {
        self.scripts
            .lock()
            .unwrap()
            .insert(url.to_string(), response);
    }

    /// Every request made so far, oldest first.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get_stream(&self, url: &str, headers: &Headers) -> Result<ByteStream, TransportError> {
        self.log.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            headers: headers.clone(),
        });

        let script = self.scripts.lock().unwrap().get(url).cloned();
        let (chunks, failure) = match script {
            Some(MockResponse::Stream(chunks)) => (chunks, None),
            Some(MockResponse::StreamThenError(chunks, err)) => (chunks, Some(err)),
            Some(MockResponse::Error(err)) => return Err(err),
            None => return Err(TransportError::Other(format!("no script for {}", url))),
        };

        let items = chunks.into_iter().map(Ok).chain(failure.map(Err));
        Ok(Box::pin(stream::iter(items)))
    }
}
