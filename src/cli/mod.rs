//! CLI for the ssewire demo binary.
//!
//! ```text
//! ssewire serve [ADDR]   run the demo server (default 127.0.0.1:8080)
//! ssewire listen URI     print events from a remote stream
//! ssewire --version
//! ```

pub mod args;
pub mod version;

pub use args::{parse_args, CliCommand, DEFAULT_SERVE_ADDR};
pub use version::{version_line, VERSION};

/// Usage text printed by `--help` and on invalid arguments.
pub const USAGE: &str = "\
Usage:
  ssewire serve [ADDR]   Run the demo server (default 127.0.0.1:8080)
  ssewire listen URI     Print events from a remote stream
  ssewire --version      Show version information

Environment:
  RUST_LOG                 Log filter (default ssewire=info)
  SSEWIRE_RETRY_MS         Reconnection delay announced by the server
  SSEWIRE_QUEUE_CAPACITY   Per-connection outbound queue size";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_mentions_commands() {
        assert!(USAGE.contains("serve"));
        assert!(USAGE.contains("listen"));
        assert!(USAGE.contains(crate::config::ENV_RETRY_MS));
        assert!(USAGE.contains(crate::config::ENV_QUEUE_CAPACITY));
    }
}
