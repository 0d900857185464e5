use std::io::Write;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use ssewire::cli::{parse_args, version_line, CliCommand, USAGE};
use ssewire::demo::{start_demo_server_on, DemoState};
use ssewire::{Event, Notifier, Upgrader, UpgraderConfig};

/// Capacity of the channel between the notifier and the printer.
const LISTEN_BUFFER: usize = 64;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ssewire=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    match parse_args(std::env::args()) {
        CliCommand::Version => {
            println!("{}", version_line());
            Ok(())
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        CliCommand::Invalid(reason) => {
            eprintln!("{}\n\n{}", reason, USAGE);
            std::process::exit(2);
        }
        CliCommand::Serve { addr } => {
            init_tracing();
            serve(addr).await
        }
        CliCommand::Listen { uri } => {
            init_tracing();
            listen(&uri).await
        }
    }
}

async fn serve(addr: std::net::SocketAddr) -> Result<()> {
    let state = DemoState {
        upgrader: Upgrader::new(UpgraderConfig::from_env()),
        ..DemoState::default()
    };
    let (handle, _) = start_demo_server_on(addr, state).await?;

    tokio::select! {
        result = handle => result?,
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("Shutting down");
        }
    }
    Ok(())
}

async fn listen(uri: &str) -> Result<()> {
    let (tx, mut rx) = mpsc::channel::<Event>(LISTEN_BUFFER);
    let notifier = Notifier::default();
    let uri_owned = uri.to_string();
    let stream = tokio::spawn(async move { notifier.notify(&uri_owned, Some(tx)).await });

    let mut stdout = std::io::stdout();
    while let Some(event) = rx.recv().await {
        match &event.event_type {
            Some(kind) => writeln!(stdout, "[{}] {}", kind, event.text())?,
            None => writeln!(stdout, "{}", event.text())?,
        }
    }

    stream.await?.map_err(|e| {
        eyre!(
            "stream from {} failed: {} ({})",
            uri,
            e,
            e.category().recovery_hint()
        )
    })
}
