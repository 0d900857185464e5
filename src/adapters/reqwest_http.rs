//! [`HttpClient`] over reqwest.

use async_trait::async_trait;
use futures_util::StreamExt;

use crate::error::TransportError;
use crate::traits::{ByteStream, Headers, HttpClient};

/// Opens event streams with a shared `reqwest::Client`.
///
/// Avoid configuring a total request `timeout` on the wrapped client: it
/// applies to the whole body and would cut long-lived streams off. A
/// `connect_timeout` is fine.
///
/// ```ignore
/// let client = ReqwestHttpClient::with_client(
///     reqwest::Client::builder().connect_timeout(Duration::from_secs(5)).build()?,
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing client, e.g. one with proxies or custom TLS roots.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Classify a failure that happened before any response arrived.
    fn request_error(err: reqwest::Error) -> TransportError {
        let detail = err.to_string();
        if err.is_builder() {
            TransportError::InvalidUrl(detail)
        } else if err.is_connect() {
            TransportError::ConnectionFailed(detail)
        } else if err.is_timeout() {
            TransportError::Timeout(detail)
        } else {
            TransportError::Other(detail)
        }
    }

    /// Classify a failure while reading the body.
    fn body_error(err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else {
            TransportError::Read(err.to_string())
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get_stream(&self, url: &str, headers: &Headers) -> Result<ByteStream, TransportError> {
        let request = headers
            .iter()
            .fold(self.client.get(url), |request, (name, value)| {
                request.header(name, value)
            });

        let response = request.send().await.map_err(Self::request_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::debug!(url, status = status.as_u16(), "Stream request rejected");
            return Err(TransportError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(Box::pin(response.bytes_stream().map(|chunk| chunk.map_err(Self::body_error))))
    }
}
