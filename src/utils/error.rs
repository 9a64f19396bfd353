//! The `error` module defines the error types used within `signal-relay`.
//!
//! Two families exist:
//! - [`RelayError`]: bootstrap and transport failures (config, sockets, WebSocket I/O).
//! - [`DispatchError`]: the outcome of handling one inbound frame. Only the
//!   `Transport` variant is fatal to the connection; everything else is dropped
//!   and logged.

use thiserror::Error;

use crate::transport::message::MessageKind;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("connection closed")]
    ConnectionClosed,

    #[error("outbound queue full")]
    QueueFull,
}

/// Why a well-formed envelope was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("expected exactly one topic, got {0}")]
    TopicCount(usize),

    #[error("no topic given")]
    MissingTopic,

    #[error("already subscribed to '{0}'")]
    DuplicateSubscription(String),

    #[error("already subscribed to '{current}', cannot subscribe to '{requested}'")]
    MultipleTopics { current: String, requested: String },

    #[error("publish requires a topic and a non-empty data object")]
    InvalidPublish,

    #[error("not subscribed to '{0}'")]
    NotSubscribed(String),

    #[error("topic '{0}' does not exist")]
    UnknownTopic(String),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("rejected {kind} message: {reason}")]
    Rejected { kind: MessageKind, reason: Rejection },

    #[error("transport failure: {0}")]
    Transport(#[from] RelayError),
}

impl DispatchError {
    pub fn rejected(kind: MessageKind, reason: Rejection) -> Self {
        Self::Rejected { kind, reason }
    }

    /// Whether the connection that produced this error must be closed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
