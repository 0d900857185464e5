//! Command-line argument parsing for the ssewire demo binary.

use std::net::SocketAddr;

/// Address `serve` binds when none is given.
pub const DEFAULT_SERVE_ADDR: &str = "127.0.0.1:8080";

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Print usage
    Help,
    /// Run the demo server
    Serve { addr: SocketAddr },
    /// Print events from a remote stream
    Listen { uri: String },
    /// Arguments could not be understood
    Invalid(String),
}

/// Parse command-line arguments and return the appropriate command.
///
/// The first argument is the program name and is skipped.
///
/// # Examples
///
/// ```
/// use ssewire::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["ssewire".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    let mut args = args.skip(1);

    let Some(first) = args.next() else {
        return CliCommand::Help;
    };

    match first.as_str() {
        "--version" | "-V" => CliCommand::Version,
        "--help" | "-h" | "help" => CliCommand::Help,
        "serve" => {
            let raw = args.next().unwrap_or_else(|| DEFAULT_SERVE_ADDR.to_string());
            match raw.parse() {
                Ok(addr) => CliCommand::Serve { addr },
                Err(_) => CliCommand::Invalid(format!("invalid address: {}", raw)),
            }
        }
        "listen" => match args.next() {
            Some(uri) => CliCommand::Listen { uri },
            None => CliCommand::Invalid("listen requires a URI".to_string()),
        },
        other => CliCommand::Invalid(format!("unknown command: {}", other)),
    }
}
