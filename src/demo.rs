//! Demo event-stream server.
//!
//! Two endpoints:
//! - `/event` sends a `time` event and a `feed` event every tick
//! - `/time` sends the current time as plain data every tick and stops
//!   at the first failed write

use std::net::SocketAddr;
use std::time::Duration;

use axum::{extract::State, response::Response, routing::get, Router};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::adapters::AxumResponseWriter;
use crate::server::{Conn, Upgrader};

/// Time format used for `time` payloads, e.g. `Mon Jan 2 15:04:05 UTC 2006`.
pub const TIME_FORMAT: &str = "%a %b %-d %H:%M:%S %Z %Y";

/// Payload of every `feed` event.
pub const FEED_PAYLOAD: &str = "User XY did Z";

/// Shared state for the demo handlers.
#[derive(Debug, Clone)]
pub struct DemoState {
    /// Upgrader applied to every request
    pub upgrader: Upgrader,
    /// Pause between rounds of events
    pub tick: Duration,
}

impl Default for DemoState {
    fn default() -> Self {
        Self {
            upgrader: Upgrader::default(),
            tick: Duration::from_secs(1),
        }
    }
}

/// Build the demo router.
pub fn router(state: DemoState) -> Router {
    Router::new()
        .route("/event", get(event_handler))
        .route("/time", get(time_handler))
        .with_state(state)
}

/// Start the demo server on `addr`.
///
/// Returns the server task and the bound address, so tests can bind port 0.
pub async fn start_demo_server_on(
    addr: SocketAddr,
    state: DemoState,
) -> color_eyre::Result<(JoinHandle<()>, SocketAddr)> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!("Demo server listening on http://{}", actual_addr);

    let app = router(state);
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Demo server error: {}", e);
        }
    });

    Ok((handle, actual_addr))
}

fn now() -> String {
    chrono::Utc::now().format(TIME_FORMAT).to_string()
}

/// Upgrade the request and hand the connection to `stream` on its own task.
async fn spawn_stream<F, Fut>(state: DemoState, stream: F) -> Response
where
    F: FnOnce(Conn, Duration) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let (writer, response) = AxumResponseWriter::new();
    tokio::spawn(async move {
        match state.upgrader.upgrade(writer).await {
            Ok(conn) => stream(conn, state.tick).await,
            Err(e) => warn!("Upgrade failed: {}", e),
        }
    });
    response.await
}

async fn event_handler(State(state): State<DemoState>) -> Response {
    spawn_stream(state, |conn, tick| async move {
        loop {
            let sent = async {
                conn.write_string_event("time", &now()).await?;
                conn.write_string_event("feed", FEED_PAYLOAD).await
            }
            .await;
            if let Err(e) = sent {
                debug!(conn_id = %conn.id(), "Event stream finished: {}", e);
                return;
            }
            tokio::time::sleep(tick).await;
        }
    })
    .await
}

async fn time_handler(State(state): State<DemoState>) -> Response {
    spawn_stream(state, |conn, tick| async move {
        while conn.write_string(&now()).await.is_ok() {
            tokio::time::sleep(tick).await;
        }
        debug!(conn_id = %conn.id(), "Time stream finished");
    })
    .await
}
