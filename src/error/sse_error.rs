//! The crate-wide error type.

use thiserror::Error;

use super::category::ErrorCategory;
use super::transport::TransportError;

/// Errors returned by connection, upgrade and notify operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SseError {
    /// The response cannot flush partial output or cannot report
    /// peer disconnects. The peer has been sent an HTTP 500.
    #[error("Streaming unsupported!")]
    StreamingUnsupported,

    /// A write was attempted after the connection closed.
    #[error("Connection already closed")]
    ConnectionClosed,

    /// A JSON or XML value could not be encoded.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// `notify` was called without an event sink.
    #[error("nil channel given")]
    NilChannel,

    /// The underlying transport failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl SseError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            SseError::StreamingUnsupported => ErrorCategory::Unsupported,
            SseError::ConnectionClosed => ErrorCategory::Closed,
            SseError::SerializationFailed(_) | SseError::NilChannel => ErrorCategory::Client,
            SseError::Transport(err) => err.category(),
        }
    }

    /// Check if the failed operation may succeed when retried.
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Short machine-readable code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            SseError::StreamingUnsupported => "SSE_STREAMING_UNSUPPORTED",
            SseError::ConnectionClosed => "SSE_CONNECTION_CLOSED",
            SseError::SerializationFailed(_) => "SSE_SERIALIZATION_FAILED",
            SseError::NilChannel => "SSE_NIL_CHANNEL",
            SseError::Transport(_) => "SSE_TRANSPORT",
        }
    }
}

impl From<serde_json::Error> for SseError {
    fn from(err: serde_json::Error) -> Self {
        SseError::SerializationFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(SseError::StreamingUnsupported.to_string(), "Streaming unsupported!");
        assert_eq!(SseError::ConnectionClosed.to_string(), "Connection already closed");
        assert_eq!(SseError::NilChannel.to_string(), "nil channel given");
    }

    #[test]
    fn test_transport_is_transparent() {
        let err: SseError = TransportError::Read("reset by peer".to_string()).into();
        assert_eq!(err.to_string(), "Read failed: reset by peer");
        assert_eq!(err.category(), ErrorCategory::Network);
        assert!(err.is_retryable());
    }

    #[test]
    fn test_categories() {
        assert_eq!(SseError::ConnectionClosed.category(), ErrorCategory::Closed);
        assert_eq!(SseError::NilChannel.category(), ErrorCategory::Client);
        assert_eq!(
            SseError::StreamingUnsupported.category(),
            ErrorCategory::Unsupported
        );
        let status: SseError = TransportError::Status {
            status: 502,
            message: "bad gateway".to_string(),
        }
        .into();
        assert_eq!(status.category(), ErrorCategory::Server);
        assert!(!SseError::ConnectionClosed.is_retryable());
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: SseError = json_err.into();
        assert!(matches!(err, SseError::SerializationFailed(_)));
        assert_eq!(err.error_code(), "SSE_SERIALIZATION_FAILED");
    }

    #[test]
    fn test_status_retry_signals_agree() {
        for (status, retryable) in [(404, false), (503, true)] {
            let err: SseError = TransportError::Status {
                status,
                message: String::new(),
            }
            .into();
            assert_eq!(err.is_retryable(), retryable);
            assert_eq!(err.category().is_retryable(), err.is_retryable());
        }
        let not_found: SseError = TransportError::Status {
            status: 404,
            message: "missing".to_string(),
        }
        .into();
        assert_eq!(not_found.category(), ErrorCategory::Client);
    }
}
