//! Message dispatcher
//!
//! Interprets one inbound text frame against the session's state and drives
//! the registry. Responsibilities:
//! - `ping`: answer with `pong` on the same connection
//! - `subscribe` / `unsubscribe`: keep `Session::topic` and registry
//!   membership in step
//! - `publish`: forward the original frame bytes to every other subscriber
//!
//! Invalid input never produces a reply. It comes back as a non-fatal
//! `DispatchError` for the caller to log.

use std::sync::Arc;

use tracing::{debug, warn};
use tungstenite::Utf8Bytes;
use tungstenite::protocol::Message as WsMessage;

use crate::broker::TopicRegistry;
use crate::session::Session;
use crate::transport::message::{Envelope, MessageKind, PONG_MESSAGE};
use crate::utils::error::{DispatchError, Rejection};

#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<TopicRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<TopicRegistry>) -> Self {
        Self { registry }
    }

    pub fn handle_frame(
        &self,
        session: &mut Session,
        frame: Utf8Bytes,
    ) -> Result<(), DispatchError> {
        let envelope = Envelope::parse(frame.as_str())?;

        match envelope.kind {
            MessageKind::Ping => {
                session.send(WsMessage::text(PONG_MESSAGE))?;
                Ok(())
            }
            MessageKind::Pong => {
                debug!(session = %session.id(), "ignoring pong from client");
                Ok(())
            }
            MessageKind::Subscribe => self.subscribe(session, envelope),
            MessageKind::Unsubscribe => self.unsubscribe(session, envelope),
            MessageKind::Publish => self.publish(session, envelope, frame),
        }
    }

    fn subscribe(&self, session: &mut Session, envelope: Envelope) -> Result<(), DispatchError> {
        let reject = |reason| DispatchError::rejected(MessageKind::Subscribe, reason);

        let [requested]: [String; 1] = envelope
            .topics
            .try_into()
            .map_err(|topics: Vec<String>| reject(Rejection::TopicCount(topics.len())))?;

        if let Some(current) = session.topic() {
            let reason = if current == requested {
                Rejection::DuplicateSubscription(requested)
            } else {
                Rejection::MultipleTopics {
                    current: current.to_string(),
                    requested,
                }
            };
            return Err(reject(reason));
        }

        self.registry.subscribe(&requested, session.id());
        session.set_topic(requested);
        Ok(())
    }

    fn unsubscribe(&self, session: &mut Session, envelope: Envelope) -> Result<(), DispatchError> {
        let Some(requested) = envelope.topics.into_iter().next() else {
            return Err(DispatchError::rejected(
                MessageKind::Unsubscribe,
                Rejection::MissingTopic,
            ));
        };

        match session.topic() {
            Some(current) if current == requested => {
                session.clear_topic();
                self.registry.unsubscribe(&requested, session.id());
                Ok(())
            }
            Some(_) => Err(DispatchError::rejected(
                MessageKind::Unsubscribe,
                Rejection::NotSubscribed(requested),
            )),
            None => {
                debug!(session = %session.id(), topic = %requested, "unsubscribe while not subscribed");
                Ok(())
            }
        }
    }

    fn publish(
        &self,
        session: &Session,
        envelope: Envelope,
        frame: Utf8Bytes,
    ) -> Result<(), DispatchError> {
        let reject = |reason| DispatchError::rejected(MessageKind::Publish, reason);

        let has_data = envelope.data.as_ref().is_some_and(|data| !data.is_empty());
        if envelope.topic.is_empty() || !has_data {
            return Err(reject(Rejection::InvalidPublish));
        }
        if session.topic() != Some(envelope.topic.as_str()) {
            return Err(reject(Rejection::NotSubscribed(envelope.topic)));
        }

        let Some(recipients) = self.registry.publish(&envelope.topic, session.id()) else {
            return Err(reject(Rejection::UnknownTopic(envelope.topic)));
        };

        // Same bytes to everyone; a dead or backed-up peer only costs its own delivery.
        let msg = WsMessage::Text(frame);
        for recipient in recipients {
            if let Err(e) = recipient.outbound.send(msg.clone()) {
                warn!(
                    session = %session.id(),
                    peer = %recipient.id,
                    topic = %envelope.topic,
                    "write to peer failed: {e}"
                );
            }
        }
        Ok(())
    }
}
