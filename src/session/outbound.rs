//! Outbound handle
//!
//! `Outbound` is the sending side of a bounded per-connection queue. The
//! connection's writer task owns the receiving side and flushes frames to the
//! socket. Sends never wait: a full queue means the client is not keeping up,
//! and a closed queue means its writer is gone.

use tokio::sync::mpsc::Sender;
use tokio::sync::mpsc::error::TrySendError;
use tungstenite::protocol::Message as WsMessage;

use crate::utils::error::RelayError;

/// Frames buffered per connection before sends start failing.
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct Outbound {
    sender: Sender<WsMessage>,
}

impl Outbound {
    pub fn new(sender: Sender<WsMessage>) -> Self {
        Self { sender }
    }

    pub fn send(&self, msg: WsMessage) -> Result<(), RelayError> {
        self.sender.try_send(msg).map_err(|e| match e {
            TrySendError::Full(_) => RelayError::QueueFull,
            TrySendError::Closed(_) => RelayError::ConnectionClosed,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
