//! End-to-end tests: axum server + AxumResponseWriter, read back with
//! reqwest and the Notifier.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{extract::State, response::Response, routing::get, Router};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::timeout;

use ssewire::adapters::AxumResponseWriter;
use ssewire::demo::{start_demo_server_on, DemoState, FEED_PAYLOAD};
use ssewire::{upgrade, Event, Notifier, SseError, Upgrader, UpgraderConfig};

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct User {
    name: String,
    id: u32,
}

/// Serve `app` on a random local port.
async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn start_demo() -> SocketAddr {
    let state = DemoState {
        tick: Duration::from_millis(20),
        ..DemoState::default()
    };
    let (_handle, addr) = start_demo_server_on("127.0.0.1:0".parse().unwrap(), state)
        .await
        .expect("Failed to start demo server");
    addr
}

/// Read raw body bytes until `needle` shows up.
async fn read_until(response: reqwest::Response, needle: &str) -> String {
    let mut body = response.bytes_stream();
    let mut text = String::new();
    while !text.contains(needle) {
        let chunk = timeout(TEST_TIMEOUT, body.next())
            .await
            .expect("timed out reading body")
            .expect("body ended early")
            .expect("body read failed");
        text.push_str(&String::from_utf8_lossy(&chunk));
    }
    text
}

#[tokio::test]
async fn test_demo_event_endpoint_streams_time_and_feed() {
    let addr = start_demo().await;
    let uri = format!("http://{}/event", addr);

    let (tx, mut rx) = mpsc::channel::<Event>(8);
    let notifier = Notifier::default();
    let task_uri = uri.clone();
    let task = tokio::spawn(async move { notifier.notify(&task_uri, Some(tx)).await });

    let first = timeout(TEST_TIMEOUT, rx.recv()).await.unwrap().unwrap();
    let second = timeout(TEST_TIMEOUT, rx.recv()).await.unwrap().unwrap();

    assert_eq!(first.uri, uri);
    assert_eq!(first.event_type.as_deref(), Some("time"));
    assert!(first.text().contains("UTC"));
    assert_eq!(second.event_type.as_deref(), Some("feed"));
    assert_eq!(second.text(), FEED_PAYLOAD);

    drop(rx);
    let result = timeout(TEST_TIMEOUT, task).await.unwrap().unwrap();
    assert_eq!(result, Ok(()));
}

#[tokio::test]
async fn test_demo_time_endpoint_headers_and_plain_data() {
    let addr = start_demo().await;

    let response = reqwest::get(format!("http://{}/time", addr)).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "text/event-stream"
    );
    assert_eq!(response.headers().get("cache-control").unwrap(), "no-cache");

    let text = read_until(response, "\n\n").await;
    assert!(text.starts_with("data: "), "unexpected frame: {:?}", text);
    assert!(!text.contains("event:"));
}

#[tokio::test]
async fn test_json_event_round_trip() {
    async fn handler() -> Response {
        let (writer, response) = AxumResponseWriter::new();
        tokio::spawn(async move {
            let conn = upgrade(writer).await.unwrap();
            conn.write_json_event(
                "user",
                &User {
                    name: "ada".to_string(),
                    id: 7,
                },
            )
            .await
            .unwrap();
            conn.close();
        });
        response.await
    }

    let addr = serve(Router::new().route("/users", get(handler))).await;
    let (tx, mut rx) = mpsc::channel(8);
    let result = timeout(
        TEST_TIMEOUT,
        Notifier::default().notify(&format!("http://{}/users", addr), Some(tx)),
    )
    .await
    .expect("stream should end after close");
    assert_eq!(result, Ok(()));

    let event = rx.recv().await.unwrap();
    assert_eq!(event.event_type.as_deref(), Some("user"));
    assert_eq!(
        event.json::<User>().unwrap(),
        User {
            name: "ada".to_string(),
            id: 7
        }
    );
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn test_close_delivers_every_queued_message() {
    async fn handler() -> Response {
        let (writer, response) = AxumResponseWriter::new();
        tokio::spawn(async move {
            let conn = upgrade(writer).await.unwrap();
            for i in 0..50 {
                conn.write_string(&i.to_string()).await.unwrap();
            }
            conn.close();
        });
        response.await
    }

    let addr = serve(Router::new().route("/burst", get(handler))).await;
    let response = reqwest::get(format!("http://{}/burst", addr)).await.unwrap();
    let body = timeout(TEST_TIMEOUT, response.text()).await.unwrap().unwrap();

    let expected: String = (0..50).map(|i| format!("data: {}\n\n", i)).collect();
    assert_eq!(body, expected);
}

#[tokio::test]
async fn test_retry_frame_is_sent_first() {
    async fn handler(State(upgrader): State<Upgrader>) -> Response {
        let (writer, response) = AxumResponseWriter::new();
        tokio::spawn(async move {
            let conn = upgrader.upgrade(writer).await.unwrap();
            conn.write_string("hello").await.unwrap();
            conn.close();
        });
        response.await
    }

    let upgrader =
        Upgrader::new(UpgraderConfig::default().with_retry(Duration::from_millis(1500)));
    let app = Router::new().route("/retry", get(handler)).with_state(upgrader);
    let addr = serve(app).await;

    let response = reqwest::get(format!("http://{}/retry", addr)).await.unwrap();
    let body = timeout(TEST_TIMEOUT, response.text()).await.unwrap().unwrap();
    assert_eq!(body, "retry: 1500\n\ndata: hello\n\n");
}

#[tokio::test]
async fn test_client_disconnect_closes_connection() {
    async fn handler(State(results): State<mpsc::Sender<SseError>>) -> Response {
        let (writer, response) = AxumResponseWriter::new();
        tokio::spawn(async move {
            let conn = upgrade(writer).await.unwrap();
            loop {
                if let Err(e) = conn.write_string("tick").await {
                    assert!(!conn.is_open());
                    let _ = results.send(e).await;
                    return;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        });
        response.await
    }

    let (results_tx, mut results_rx) = mpsc::channel(1);
    let app = Router::new()
        .route("/ticks", get(handler))
        .with_state(results_tx);
    let addr = serve(app).await;

    let response = reqwest::get(format!("http://{}/ticks", addr)).await.unwrap();
    let first = read_until(response, "\n\n").await;
    assert!(first.starts_with("data: tick\n\n"));

    let err = timeout(TEST_TIMEOUT, results_rx.recv())
        .await
        .expect("server should notice the disconnect")
        .unwrap();
    assert_eq!(err, SseError::ConnectionClosed);
}
