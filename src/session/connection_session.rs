//! Session representation
//!
//! A `Session` models one connected client: its id, the single topic it may be
//! subscribed to, and the outbound handle used for direct replies. The session
//! is owned by the connection task; the registry only ever sees its id and a
//! clone of the outbound handle.

use chrono::{DateTime, Utc};
use tracing::info;
use tungstenite::protocol::Message as WsMessage;

use crate::broker::TopicRegistry;
use crate::session::{Outbound, SessionId};
use crate::utils::error::RelayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    Subscribed,
}

#[derive(Debug)]
pub struct Session {
    id: SessionId,
    topic: Option<String>,
    outbound: Outbound,
    connected_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: SessionId, outbound: Outbound) -> Self {
        Self {
            id,
            topic: None,
            outbound,
            connected_at: Utc::now(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn state(&self) -> SessionState {
        match self.topic {
            Some(_) => SessionState::Subscribed,
            None => SessionState::Connected,
        }
    }

    pub fn outbound(&self) -> &Outbound {
        &self.outbound
    }

    /// Reply directly to this client.
    pub fn send(&self, msg: WsMessage) -> Result<(), RelayError> {
        self.outbound.send(msg)
    }

    pub(crate) fn set_topic(&mut self, topic: String) {
        self.topic = Some(topic);
    }

    pub(crate) fn clear_topic(&mut self) -> Option<String> {
        self.topic.take()
    }

    /// Closes the session and removes every trace of it from the registry.
    ///
    /// Takes `self` by value: a closed session cannot process or send anything
    /// else, and cleanup cannot run twice.
    pub fn close(mut self, registry: &TopicRegistry) {
        if let Some(topic) = self.clear_topic() {
            registry.unsubscribe(&topic, self.id);
        }
        registry.remove_peer(self.id);

        let lifetime = Utc::now() - self.connected_at;
        info!(
            session = %self.id,
            secs = lifetime.num_seconds(),
            "client disconnected"
        );
    }
}
