//! Concrete implementations of the traits in `crate::traits`.
//!
//! # Adapters
//!
//! - [`AxumResponseWriter`] - streaming axum response for the server half
//! - [`ReqwestHttpClient`] - reqwest client for the notifier
//!
//! # Mock Implementations
//!
//! The [`mock`] submodule provides test doubles for both traits.

pub mod axum_response;
pub mod mock;
pub mod reqwest_http;

pub use axum_response::{AxumResponseWriter, PendingResponse};
pub use mock::{MockHttpClient, MockResponseWriter};
pub use reqwest_http::ReqwestHttpClient;
