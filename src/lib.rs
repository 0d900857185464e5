//! ssewire - Server-Sent Events for tokio
//!
//! Server side: [`Upgrader::upgrade`] turns a streaming HTTP response into a
//! [`Conn`] whose writes are queued and sent by a per-connection writer
//! task. Client side: [`Notifier::notify`] reads a remote event stream and
//! forwards decoded [`Event`]s to a channel.
//!
//! This library also exposes its adapters and mocks for use in
//! integration tests.

pub mod adapters;
pub mod cli;
pub mod client;
pub mod config;
pub mod demo;
pub mod error;
pub mod server;
pub mod sse;
pub mod traits;

pub use client::{notify, Notifier};
pub use config::{NotifierConfig, UpgraderConfig};
pub use error::{ErrorCategory, SseError, SseResult, TransportError};
pub use server::{upgrade, Conn, ConnState, Upgrader};
pub use sse::{Event, Message};
