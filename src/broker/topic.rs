//! Topic management
//!
//! A `Topic` holds the ordered list of sessions joined to one topic name.
//! Subscribers are kept in join order and are unique by `SessionId`.
//!
//! Concurrency note: `Topic` has no synchronization of its own. It is only
//! reachable through `TopicRegistry`, which mutates it under the owning shard
//! lock.

use crate::session::SessionId;

#[derive(Debug, Clone, Default)]
pub struct Topic {
    pub name: String,
    subscribers: Vec<SessionId>,
}

impl Topic {
    /// Create a new, empty topic with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            subscribers: Vec::new(),
        }
    }

    /// Append a subscriber. Returns `false` if it was already present.
    pub fn subscribe(&mut self, id: SessionId) -> bool {
        if self.contains(id) {
            return false;
        }
        self.subscribers.push(id);
        true
    }

    /// Remove a subscriber, keeping the order of the rest.
    pub fn unsubscribe(&mut self, id: SessionId) -> bool {
        match self.subscribers.iter().position(|s| *s == id) {
            Some(index) => {
                self.subscribers.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.subscribers.contains(&id)
    }

    pub fn subscribers(&self) -> &[SessionId] {
        &self.subscribers
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
