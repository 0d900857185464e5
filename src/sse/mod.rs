//! SSE wire format shared by the server and client halves.
//!
//! # Module structure
//! - `constants` - header values, field names, default tunables
//! - `events` - `Message`, `Event` and `SseLine`
//! - `frame` - frame encoding used by the writer task
//! - `parser` - line classification and the incremental `SseParser`

pub mod constants;
mod events;
mod frame;
mod parser;

pub use events::{Event, Message, SseLine};
pub use frame::{encode_message, message_frame, retry_frame};
pub use parser::{parse_sse_line, SseParser};
