//! Fan-out Bus (spec.md §4.6): a per-session in-memory publisher. The
//! Event Store calls `publish` after every successful append on that
//! session; filtering happens at the subscriber, never here.
//!
//! Grounded on the teacher's `services/game/store.rs` registry shape — a
//! lock-guarded keyed map of `Arc` handles — generalized from a game
//! registry to a per-session broadcast-channel registry.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use log::warn;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::events::Event;

/// Bounded per-subscriber channel capacity. A slow consumer gets dropped
/// rather than allowed to backpressure the publisher (spec.md §4.6).
const SUBSCRIBER_CAPACITY: usize = 256;

pub type SubscriberId = u64;

struct SessionTopic {
    next_subscriber_id: AtomicU64,
    subscribers: RwLock<HashMap<SubscriberId, mpsc::Sender<Event>>>,
}

impl Default for SessionTopic {
    fn default() -> Self {
        Self {
            next_subscriber_id: AtomicU64::new(1),
            subscribers: RwLock::new(HashMap::new()),
        }
    }
}

/// The process-local registry of per-session topics.
#[derive(Default)]
pub struct FanoutBus {
    sessions: RwLock<HashMap<Uuid, Arc<SessionTopic>>>,
}

impl FanoutBus {
    /// Registers a new subscriber for `session_id`, creating the topic if
    /// this is its first subscriber.
    pub fn subscribe(&self, session_id: Uuid) -> (SubscriberId, mpsc::Receiver<Event>) {
        let topic = {
            let read = self.sessions.read();
            if let Some(topic) = read.get(&session_id) {
                topic.clone()
            } else {
                drop(read);
                self.sessions
                    .write()
                    .entry(session_id)
                    .or_insert_with(|| Arc::new(SessionTopic::default()))
                    .clone()
            }
        };

        let id = topic.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(SUBSCRIBER_CAPACITY);
        topic.subscribers.write().insert(id, tx);
        (id, rx)
    }

    pub fn unsubscribe(&self, session_id: Uuid, subscriber_id: SubscriberId) {
        if let Some(topic) = self.sessions.read().get(&session_id) {
            topic.subscribers.write().remove(&subscriber_id);
        }
    }

    /// Publishes `event` to every live subscriber of `session_id`. Slow
    /// subscribers (a full bounded channel) are dropped with a warning —
    /// they recover via the catch-up path in spec.md §4.5 on reconnect.
    pub fn publish(&self, session_id: Uuid, event: Event) {
        let Some(topic) = self.sessions.read().get(&session_id).cloned() else {
            return;
        };

        let mut dead = Vec::new();
        {
            let subscribers = topic.subscribers.read();
            for (&id, tx) in subscribers.iter() {
                match tx.try_send(event.clone()) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        warn!(
                            "fan-out bus: dropping slow subscriber {id} of session {session_id}"
                        );
                        dead.push(id);
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => dead.push(id),
                }
            }
        }

        if !dead.is_empty() {
            let mut subscribers = topic.subscribers.write();
            for id in dead {
                subscribers.remove(&id);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::events::{EventData, EventType};
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_event() -> Event {
        Event {
            id: 1,
            session_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            from_player: 1,
            to_player: 2,
            to_player_idx: Some(1),
            item_id: Some(1),
            location_id: Some(1),
            event_type: EventType::NewItem,
            frame_time: Some(1),
            event_data: EventData::default(),
        }
    }

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let bus = FanoutBus::default();
        let session_id = Uuid::new_v4();
        let (_id, mut rx) = bus.subscribe(session_id);

        let event = sample_event();
        bus.publish(session_id, event.clone());

        let received = rx.recv().await.unwrap();
        assert_eq!(received.id, event.id);
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_is_a_no_op() {
        let bus = FanoutBus::default();
        bus.publish(Uuid::new_v4(), sample_event());
    }

    #[tokio::test]
    async fn unsubscribe_stops_delivery() {
        let bus = FanoutBus::default();
        let session_id = Uuid::new_v4();
        let (id, mut rx) = bus.subscribe(session_id);
        bus.unsubscribe(session_id, id);

        bus.publish(session_id, sample_event());
        assert!(rx.try_recv().is_err());
    }
}
