//! Server half: upgrading a response and pushing events through it.
//!
//! ```text
//! app ─write*─▶ Conn ─queue─▶ writer task ─frames─▶ ResponseWriter ─▶ peer
//! ```
//!
//! - `conn` - the application-facing handle and its state machine
//! - `upgrader` - capability checks, stream headers, writer task start
//! - `writer` - the task that owns the response body

mod conn;
mod upgrader;
mod writer;

pub use conn::{Conn, ConnState};
pub use upgrader::{upgrade, Upgrader};
