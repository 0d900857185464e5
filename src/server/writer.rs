//! The writer task: sole owner of a connection's response body.

use std::sync::Arc;

use bytes::BytesMut;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::conn::Shared;
use crate::error::TransportError;
use crate::sse::{encode_message, Message};
use crate::traits::{CloseNotify, ResponseWriter};

/// Why the writer task stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ExitReason {
    /// `close()` was called; queued messages were flushed first.
    Shutdown,
    /// Every `Conn` handle was dropped.
    HandlesDropped,
    /// The transport reported that the peer went away.
    PeerDisconnected,
    /// Writing or flushing failed.
    Transport(TransportError),
}

impl From<TransportError> for ExitReason {
    /// A write that fails because the peer left is a disconnect, not a
    /// transport fault.
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Disconnected => ExitReason::PeerDisconnected,
            other => ExitReason::Transport(other),
        }
    }
}

/// Run the event loop for one connection until it closes.
///
/// Waits on three sources at once: queued messages, a local close request,
/// and the peer-disconnect notification. Whichever is ready first is
/// handled; the connection is marked closed exactly once on the way out.
pub(crate) async fn run_writer<W: ResponseWriter>(
    mut writer: W,
    mut outbound: mpsc::Receiver<Message>,
    shared: Arc<Shared>,
    mut close_notify: CloseNotify,
) -> ExitReason {
    debug!(conn_id = %shared.id, "Writer task started");
    let mut buf = BytesMut::new();

    let reason = loop {
        let exit = tokio::select! {
            message = outbound.recv() => match message {
                Some(message) => write_frame(&mut writer, &mut buf, &message)
                    .await
                    .err()
                    .map(ExitReason::from),
                None => Some(ExitReason::HandlesDropped),
            },
            _ = shared.shutdown.notified() => {
                Some(drain(&mut writer, &mut buf, &mut outbound).await)
            }
            _ = &mut close_notify => Some(ExitReason::PeerDisconnected),
        };

        if let Some(reason) = exit {
            break reason;
        }
    };

    shared.mark_closed();

    match &reason {
        ExitReason::Transport(e) => {
            warn!(
                conn_id = %shared.id,
                category = %e.category(),
                "Connection closed after transport error: {}",
                e
            )
        }
        other => info!(conn_id = %shared.id, "Connection closed: {:?}", other),
    }

    reason
}

/// Stop accepting messages and write everything already queued.
async fn drain<W: ResponseWriter>(
    writer: &mut W,
    buf: &mut BytesMut,
    outbound: &mut mpsc::Receiver<Message>,
) -> ExitReason {
    outbound.close();

    let mut drained = 0usize;
    while let Some(message) = outbound.recv().await {
        if let Err(e) = write_frame(writer, buf, &message).await {
            return e.into();
        }
        drained += 1;
    }

    if drained > 0 {
        debug!("Flushed {} queued message(s) before closing", drained);
    }
    ExitReason::Shutdown
}

async fn write_frame<W: ResponseWriter>(
    writer: &mut W,
    buf: &mut BytesMut,
    message: &Message,
) -> Result<(), TransportError> {
    buf.clear();
    encode_message(message, buf);
    writer.write(&buf[..]).await?;
    writer.flush().await
}
