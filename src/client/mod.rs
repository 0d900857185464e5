//! Client half: reading a remote event stream into a channel.

mod notifier;

pub use notifier::{notify, Notifier};
