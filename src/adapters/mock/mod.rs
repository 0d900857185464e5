//! Mock implementations for testing.
//!
//! Enables unit testing of both halves without sockets.
//!
//! # Available Mocks
//!
//! - [`MockResponseWriter`] - recording response with switchable capabilities
//! - [`MockHttpClient`] - HTTP client serving canned byte streams

pub mod http;
pub mod response;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use response::MockResponseWriter;
