//! Connection lifecycle
//!
//! Runs one upgraded WebSocket connection from first frame to cleanup:
//! - create the `Session` and make it reachable for fan-out
//! - spawn the writer task that drains the session's bounded outbound queue
//! - feed every text frame to the `Dispatcher`
//! - on close, read error, writer failure or a fatal dispatch error, close
//!   the session exactly once, then let the writer flush what is queued and
//!   send the closing handshake

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_tungstenite::WebSocketStream;
use tracing::{debug, info, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::broker::TopicRegistry;
use crate::session::{Outbound, Session, SessionId};
use crate::transport::dispatcher::Dispatcher;
use crate::utils::error::{DispatchError, RelayError};

/// How long the writer may keep flushing after the session is closed.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// Handles one newly established, origin-approved connection until it ends.
///
/// `queue_capacity` bounds the frames buffered for this client; once full,
/// further sends to it fail instead of growing memory.
pub async fn handle_connection<S>(
    ws_stream: WebSocketStream<S>,
    registry: Arc<TopicRegistry>,
    id: SessionId,
    queue_capacity: usize,
) where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, mut rx) = mpsc::channel::<WsMessage>(queue_capacity.max(1));

    let mut session = Session::new(id, Outbound::new(tx));
    registry.register_peer(id, session.outbound().clone());
    info!(session = %id, "client connected");

    // Ends once every sender is gone, which happens when the session closes.
    let mut writer = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            ws_sender.send(msg).await?;
        }
        ws_sender.close().await?;
        Ok::<(), RelayError>(())
    });

    let dispatcher = Dispatcher::new(registry.clone());
    let mut writer_done = false;

    loop {
        tokio::select! {
            frame = ws_receiver.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => {
                    match dispatcher.handle_frame(&mut session, text) {
                        Ok(()) => {}
                        Err(e) if e.is_fatal() => {
                            warn!(session = %id, "write failed: {e}");
                            break;
                        }
                        Err(e @ DispatchError::Malformed(_)) => {
                            info!(session = %id, "received invalid message: {e}");
                        }
                        Err(e) => {
                            info!(session = %id, "{e}");
                        }
                    }
                }
                Some(Ok(WsMessage::Binary(data))) => {
                    debug!(session = %id, len = data.len(), "dropping binary frame");
                }
                Some(Ok(WsMessage::Close(_))) | None => break,
                // ping/pong control frames are answered by tungstenite
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(session = %id, "read failed: {e}");
                    break;
                }
            },
            result = &mut writer => {
                match result {
                    Ok(Err(e)) => warn!(session = %id, "send loop failed: {e}"),
                    Err(e) => warn!(session = %id, "send loop aborted: {e}"),
                    Ok(Ok(())) => debug!(session = %id, "send loop closed"),
                }
                writer_done = true;
                break;
            }
        }
    }

    session.close(&registry);

    if !writer_done {
        match tokio::time::timeout(CLOSE_GRACE, &mut writer).await {
            // the peer may already be gone, so a failed close is routine here
            Ok(Ok(Err(e))) => debug!(session = %id, "closing handshake failed: {e}"),
            Ok(Ok(Ok(()))) => debug!(session = %id, "send loop drained"),
            Ok(Err(e)) => warn!(session = %id, "send loop aborted: {e}"),
            Err(_) => {
                debug!(session = %id, "send loop did not drain in time");
                writer.abort();
            }
        }
    }
}
