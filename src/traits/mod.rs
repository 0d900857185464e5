//! Trait abstractions for dependency injection and testability.
//!
//! - [`ResponseWriter`] - the server-side response a connection streams into
//! - [`HttpClient`] - streaming GET used by the notifier

pub mod http;
pub mod response;

pub use http::{set_header, ByteStream, Headers, HttpClient};
pub use response::{CloseNotify, ResponseWriter};
