//! Topic registry
//!
//! The registry maps topic names to their subscriber lists and session ids to
//! the live outbound handle of each connection. It is the only state shared
//! between connections.
//!
//! Concurrency and usage notes:
//! - Both maps are `DashMap`s, so operations on different topics land on
//!   different shards and do not contend.
//! - Every mutation of a topic happens inside a single entry guard. Removing
//!   the last subscriber deletes the topic under that same guard, so an empty
//!   topic is never observable.
//! - `publish` only takes a snapshot. The shard guard is dropped before any
//!   handle lookup, and callers send after this returns; no lock is ever held
//!   across I/O.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, info, warn};

use crate::broker::topic::Topic;
use crate::session::{Outbound, SessionId};

/// One subscriber selected for fan-out, with the handle to reach it.
#[derive(Debug, Clone)]
pub struct Recipient {
    pub id: SessionId,
    pub outbound: Outbound,
}

#[derive(Debug, Default)]
pub struct TopicRegistry {
    topics: DashMap<String, Topic>,
    peers: DashMap<SessionId, Outbound>,
}

impl TopicRegistry {
    pub fn new() -> Self {
        Self {
            topics: DashMap::new(),
            peers: DashMap::new(),
        }
    }

    /// Makes a connection reachable as a fan-out recipient.
    pub fn register_peer(&self, id: SessionId, outbound: Outbound) {
        self.peers.insert(id, outbound);
    }

    pub fn remove_peer(&self, id: SessionId) {
        self.peers.remove(&id);
    }

    /// Adds `id` to `name`, creating the topic if needed. A second subscribe of
    /// the same session is a no-op.
    pub fn subscribe(&self, name: &str, id: SessionId) {
        let added = {
            let mut topic = self
                .topics
                .entry(name.to_string())
                .or_insert_with(|| Topic::new(name));
            topic.subscribe(id)
        };

        if added {
            info!(session = %id, topic = name, "added subscriber to topic");
        } else {
            debug!(session = %id, topic = name, "subscriber already present");
        }
    }

    /// Removes `id` from `name` and drops the topic once it is empty.
    pub fn unsubscribe(&self, name: &str, id: SessionId) {
        let (removed, emptied) = match self.topics.entry(name.to_string()) {
            Entry::Occupied(mut entry) => {
                let removed = entry.get_mut().unsubscribe(id);
                if entry.get().is_empty() {
                    entry.remove();
                    (removed, true)
                } else {
                    (removed, false)
                }
            }
            Entry::Vacant(_) => (false, false),
        };

        if removed {
            info!(session = %id, topic = name, "removed subscriber from topic");
        }
        if emptied {
            info!(topic = name, topics = self.topics.len(), "cleaned up topic");
        }
    }

    /// Every current subscriber of `name` except `sender`.
    ///
    /// Returns `None` when the topic does not exist, which is distinct from an
    /// existing topic with no other members (`Some(vec![])`).
    pub fn publish(&self, name: &str, sender: SessionId) -> Option<Vec<Recipient>> {
        let ids: Vec<SessionId> = {
            let topic = self.topics.get(name)?;
            topic
                .subscribers()
                .iter()
                .copied()
                .filter(|id| *id != sender)
                .collect()
        };

        let recipients = ids
            .into_iter()
            .filter_map(|id| match self.peers.get(&id) {
                Some(outbound) => Some(Recipient {
                    id,
                    outbound: outbound.value().clone(),
                }),
                None => {
                    warn!(session = %id, topic = name, "subscriber has no live connection");
                    None
                }
            })
            .collect();

        Some(recipients)
    }

    /// Subscriber ids of `name` in join order.
    pub fn subscribers(&self, name: &str) -> Option<Vec<SessionId>> {
        self.topics
            .get(name)
            .map(|topic| topic.subscribers().to_vec())
    }

    pub fn contains_topic(&self, name: &str) -> bool {
        self.topics.contains_key(name)
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }
}
