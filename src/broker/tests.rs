use std::sync::Arc;
use std::thread;

use proptest::prelude::*;
use tokio::sync::mpsc;
use tungstenite::protocol::Message as WsMessage;

use super::TopicRegistry;
use super::topic::Topic;
use crate::session::{DEFAULT_OUTBOUND_CAPACITY, Outbound, SessionId};

fn sid(raw: u64) -> SessionId {
    SessionId::new(raw)
}

fn peer(registry: &TopicRegistry, raw: u64) -> mpsc::Receiver<WsMessage> {
    let (tx, rx) = mpsc::channel::<WsMessage>(DEFAULT_OUTBOUND_CAPACITY);
    registry.register_peer(sid(raw), Outbound::new(tx));
    rx
}

#[test]
fn test_topic_new() {
    let topic = Topic::new("room1");
    assert_eq!(topic.name, "room1");
    assert!(topic.is_empty());
}

#[test]
fn test_topic_subscribe_ignores_duplicates() {
    let mut topic = Topic::new("room1");
    assert!(topic.subscribe(sid(1)));
    assert!(!topic.subscribe(sid(1)));
    assert_eq!(topic.subscribers(), &[sid(1)]);
}

#[test]
fn test_topic_unsubscribe_preserves_order() {
    let mut topic = Topic::new("room1");
    topic.subscribe(sid(1));
    topic.subscribe(sid(2));
    topic.subscribe(sid(3));

    assert!(topic.unsubscribe(sid(2)));
    assert!(!topic.unsubscribe(sid(2)));
    assert_eq!(topic.subscribers(), &[sid(1), sid(3)]);
}

#[test]
fn test_registry_new() {
    let registry = TopicRegistry::new();
    assert_eq!(registry.topic_count(), 0);
    assert_eq!(registry.peer_count(), 0);
}

#[test]
fn test_register_and_remove_peer() {
    let registry = TopicRegistry::new();
    let _rx = peer(&registry, 1);
    assert_eq!(registry.peer_count(), 1);

    registry.remove_peer(sid(1));
    assert_eq!(registry.peer_count(), 0);
}

#[test]
fn test_subscribe_creates_topic() {
    let registry = TopicRegistry::new();
    registry.subscribe("room1", sid(1));

    assert!(registry.contains_topic("room1"));
    assert_eq!(registry.subscribers("room1"), Some(vec![sid(1)]));
}

#[test]
fn test_repeated_subscribe_is_idempotent() {
    let registry = TopicRegistry::new();
    registry.subscribe("room1", sid(1));
    registry.subscribe("room1", sid(1));

    assert_eq!(registry.subscribers("room1"), Some(vec![sid(1)]));
}

#[test]
fn test_unsubscribe_last_member_removes_topic() {
    let registry = TopicRegistry::new();
    registry.subscribe("room1", sid(1));
    registry.unsubscribe("room1", sid(1));

    assert!(!registry.contains_topic("room1"));
    assert_eq!(registry.topic_count(), 0);
}

#[test]
fn test_unsubscribe_absent_is_noop() {
    let registry = TopicRegistry::new();
    registry.subscribe("room1", sid(1));

    registry.unsubscribe("room1", sid(2));
    registry.unsubscribe("nowhere", sid(1));

    assert_eq!(registry.subscribers("room1"), Some(vec![sid(1)]));
    assert!(!registry.contains_topic("nowhere"));
}

#[test]
fn test_unsubscribe_middle_member_keeps_order() {
    let registry = TopicRegistry::new();
    registry.subscribe("room1", sid(1));
    registry.subscribe("room1", sid(2));
    registry.subscribe("room1", sid(3));

    registry.unsubscribe("room1", sid(2));

    assert_eq!(registry.subscribers("room1"), Some(vec![sid(1), sid(3)]));
}

#[test]
fn test_publish_excludes_sender() {
    let registry = TopicRegistry::new();
    let _rx1 = peer(&registry, 1);
    let _rx2 = peer(&registry, 2);
    let _rx3 = peer(&registry, 3);
    registry.subscribe("room1", sid(1));
    registry.subscribe("room1", sid(2));
    registry.subscribe("room1", sid(3));

    let recipients = registry.publish("room1", sid(2)).unwrap();
    let ids: Vec<SessionId> = recipients.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![sid(1), sid(3)]);
}

#[test]
fn test_publish_to_nonexistent_topic_is_none() {
    let registry = TopicRegistry::new();
    assert!(registry.publish("nowhere", sid(1)).is_none());
}

#[test]
fn test_publish_with_no_other_members_is_empty() {
    let registry = TopicRegistry::new();
    let _rx = peer(&registry, 1);
    registry.subscribe("room1", sid(1));

    let recipients = registry.publish("room1", sid(1)).unwrap();
    assert!(recipients.is_empty());
}

#[test]
fn test_publish_skips_subscriber_without_peer() {
    let registry = TopicRegistry::new();
    let _rx1 = peer(&registry, 1);
    registry.subscribe("room1", sid(1));
    registry.subscribe("room1", sid(2));

    let recipients = registry.publish("room1", sid(3)).unwrap();
    assert_eq!(recipients.len(), 1);
    assert_eq!(recipients[0].id, sid(1));
}

#[test]
fn test_publish_snapshot_survives_later_unsubscribe() {
    let registry = TopicRegistry::new();
    let mut rx2 = peer(&registry, 2);
    registry.subscribe("room1", sid(1));
    registry.subscribe("room1", sid(2));

    let recipients = registry.publish("room1", sid(1)).unwrap();
    registry.unsubscribe("room1", sid(2));
    registry.remove_peer(sid(2));

    for recipient in &recipients {
        recipient.outbound.send(WsMessage::text("late")).unwrap();
    }
    assert_eq!(rx2.try_recv().unwrap().to_text().unwrap(), "late");
}

#[test]
fn test_concurrent_churn_on_one_topic_leaves_no_residue() {
    let registry = Arc::new(TopicRegistry::new());
    let handles: Vec<_> = (1..=8u64)
        .map(|raw| {
            let registry = registry.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    registry.subscribe("room1", sid(raw));
                    registry.subscribe("room1", sid(raw));
                    registry.unsubscribe("room1", sid(raw));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(!registry.contains_topic("room1"));
    assert_eq!(registry.topic_count(), 0);
}

#[test]
fn test_concurrent_subscribers_are_all_recorded_once() {
    let registry = Arc::new(TopicRegistry::new());
    let handles: Vec<_> = (1..=16u64)
        .map(|raw| {
            let registry = registry.clone();
            thread::spawn(move || {
                registry.subscribe("room1", sid(raw));
                registry.subscribe("room1", sid(raw));
                registry.subscribe(&format!("room-{raw}"), sid(raw));
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let mut members = registry.subscribers("room1").unwrap();
    members.sort();
    assert_eq!(members, (1..=16u64).map(sid).collect::<Vec<_>>());
    assert_eq!(registry.topic_count(), 17);
}

#[derive(Debug, Clone)]
enum Op {
    Subscribe(u64),
    Unsubscribe(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1..6u64).prop_map(Op::Subscribe),
        (1..6u64).prop_map(Op::Unsubscribe),
    ]
}

proptest! {
    #[test]
    fn registry_matches_sequential_model(ops in prop::collection::vec(op_strategy(), 0..64)) {
        let registry = TopicRegistry::new();
        let mut model: Vec<SessionId> = Vec::new();

        for op in ops {
            match op {
                Op::Subscribe(raw) => {
                    registry.subscribe("room1", sid(raw));
                    if !model.contains(&sid(raw)) {
                        model.push(sid(raw));
                    }
                }
                Op::Unsubscribe(raw) => {
                    registry.unsubscribe("room1", sid(raw));
                    model.retain(|id| *id != sid(raw));
                }
            }

            if model.is_empty() {
                prop_assert!(!registry.contains_topic("room1"));
            } else {
                prop_assert_eq!(registry.subscribers("room1"), Some(model.clone()));
            }
        }
    }
}
