//! Transport-level failures on either side of a stream.

use thiserror::Error;

use super::category::ErrorCategory;

/// Errors raised by the HTTP transport underneath a stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Could not reach the remote endpoint.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The request timed out.
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// The server answered with a non-success status.
    #[error("Server error ({status}): {message}")]
    Status { status: u16, message: String },

    /// Reading the response body failed.
    #[error("Read failed: {0}")]
    Read(String),

    /// The peer is no longer connected.
    #[error("Peer disconnected")]
    Disconnected,

    /// The request URI could not be used.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Any other transport failure.
    #[error("Transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Classify this error for handling decisions.
    ///
    /// Only 5xx, 408 and 429 statuses count as server trouble; any other
    /// rejected request is the caller's to fix.
    pub fn category(&self) -> ErrorCategory {
        match self {
            TransportError::ConnectionFailed(_)
            | TransportError::Timeout(_)
            | TransportError::Read(_)
            | TransportError::Other(_) => ErrorCategory::Network,
            TransportError::Status { status, .. }
                if *status >= 500 || *status == 408 || *status == 429 =>
            {
                ErrorCategory::Server
            }
            TransportError::Status { .. } | TransportError::InvalidUrl(_) => {
                ErrorCategory::Client
            }
            TransportError::Disconnected => ErrorCategory::Closed,
        }
    }

    /// Check if this error is likely transient.
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }
}
