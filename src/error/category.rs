//! Error category classification.
//!
//! Categories give callers one place to decide whether an error is worth
//! retrying, without matching on every variant.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network failures while connecting or reading.
    /// Generally transient; retry policy is the caller's.
    Network,

    /// The remote server answered with an error status.
    Server,

    /// The connection is gone. Stop writing; nothing to retry on this handle.
    Closed,

    /// The transport cannot stream (missing flush or disconnect detection).
    Unsupported,

    /// Bad input from the caller, such as a value that failed to encode,
    /// a missing event sink, or a request the server rejected with 4xx.
    Client,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Server => "server",
            ErrorCategory::Closed => "closed",
            ErrorCategory::Unsupported => "unsupported",
            ErrorCategory::Client => "client",
        }
    }

    /// Returns a suggested recovery action for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check connectivity and reconnect",
            ErrorCategory::Server => "The server may be experiencing issues, try again later",
            ErrorCategory::Closed => "Stop writing to this connection",
            ErrorCategory::Unsupported => "Serve the stream from a transport that supports flushing",
            ErrorCategory::Client => "Check the request URL, headers and arguments",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
