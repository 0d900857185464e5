//! Error handling for both halves of the crate.
//!
//! | Error | Raised by | Recovery |
//! |-------|-----------|----------|
//! | `StreamingUnsupported` | `Upgrader::upgrade` | fatal to the upgrade; peer got HTTP 500 |
//! | `ConnectionClosed` | `Conn::write*` | stop writing |
//! | `SerializationFailed` | `Conn::write_json*`, `Conn::write_xml*` | caller decides |
//! | `NilChannel` | `Notifier::notify` | fix the call |
//! | `Transport` | upgrade, notify | retry policy is the caller's |

mod category;
mod result;
mod sse_error;
mod transport;

pub use category::ErrorCategory;
pub use result::SseResult;
pub use sse_error::SseError;
pub use transport::TransportError;
