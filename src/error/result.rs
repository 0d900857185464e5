//! Result type alias for stream operations.

use super::sse_error::SseError;

/// Type alias for Results using [`SseError`].
pub type SseResult<T> = Result<T, SseError>;
