//! Active-subscriber registry with prune-on-failure fan-out.
//!
//! The registry is mutated from two directions: the accept path
//! inserts a queue per new connection (and removes it when the client
//! disconnects), and the broadcast tick removes queues whose sends
//! fail. A single mutex guards the map so iteration for fan-out never
//! races a structural modification.
//!
//! Fan-out uses non-blocking sends: a full or closed queue counts as a
//! send failure. Failures are collected during the pass and pruned
//! afterwards, so every healthy subscriber is attempted before any
//! removal happens.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

/// Outbound frames queued per subscriber before the connection task
/// picks them up. At 4 Hz a client has to stall for ~8 seconds to fill
/// this and get pruned.
const SUBSCRIBER_QUEUE_CAPACITY: usize = 32;

/// Opaque identifier for one registered subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subscriber-{}", self.0)
    }
}

/// Result of one fan-out pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanoutReport {
    /// Number of subscribers the frame was queued for.
    pub delivered: usize,
    /// Number of subscribers removed because their send failed.
    pub pruned: usize,
}

/// Registered subscriber queues, keyed by id.
#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    senders: HashMap<SubscriberId, mpsc::Sender<String>>,
}

/// Lock-guarded collection of active subscriber queues.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    inner: Mutex<Inner>,
}

impl SubscriberRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber.
    ///
    /// Returns the subscriber's id and the receiving end of its
    /// outbound queue; the connection task drains the receiver into
    /// the socket.
    pub fn subscribe(&self) -> (SubscriberId, mpsc::Receiver<String>) {
        let mut guard = self.lock();
        let id = SubscriberId(guard.next_id);
        guard.next_id = guard.next_id.wrapping_add(1);
        let (tx, rx) = mpsc::channel(SUBSCRIBER_QUEUE_CAPACITY);
        guard.senders.insert(id, tx);
        (id, rx)
    }

    /// Remove a subscriber, e.g. when its connection closes.
    ///
    /// Removing an id that was already pruned is a no-op.
    pub fn unsubscribe(&self, id: SubscriberId) {
        self.lock().senders.remove(&id);
    }

    /// Number of currently registered subscribers.
    pub fn len(&self) -> usize {
        self.lock().senders.len()
    }

    /// Whether no subscribers are registered.
    pub fn is_empty(&self) -> bool {
        self.lock().senders.is_empty()
    }

    /// Queue `frame` for every registered subscriber, then prune the
    /// ones whose queue rejected it.
    ///
    /// All sends are attempted before any subscriber is removed; one
    /// broken subscriber cannot prevent delivery to the others.
    pub fn fanout(&self, frame: &str) -> FanoutReport {
        let mut guard = self.lock();

        let mut delivered: usize = 0;
        let mut failed: Vec<SubscriberId> = Vec::new();
        for (id, tx) in &guard.senders {
            match tx.try_send(frame.to_owned()) {
                Ok(()) => delivered = delivered.saturating_add(1),
                Err(_) => failed.push(*id),
            }
        }

        for id in &failed {
            guard.senders.remove(id);
        }

        FanoutReport {
            delivered,
            pruned: failed.len(),
        }
    }

    /// Acquire the registry lock, recovering from poisoning; the map
    /// is structurally valid after any completed operation.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn subscribers_receive_fanned_out_frames() {
        let registry = SubscriberRegistry::new();
        let (_id_a, mut rx_a) = registry.subscribe();
        let (_id_b, mut rx_b) = registry.subscribe();

        let report = registry.fanout("snapshot-1");
        assert_eq!(report.delivered, 2);
        assert_eq!(report.pruned, 0);
        assert_eq!(rx_a.try_recv().unwrap(), "snapshot-1");
        assert_eq!(rx_b.try_recv().unwrap(), "snapshot-1");
    }

    #[test]
    fn failing_subscriber_is_pruned_without_affecting_others() {
        let registry = SubscriberRegistry::new();
        let (_failing, rx_failing) = registry.subscribe();
        let (_healthy, mut rx_healthy) = registry.subscribe();

        // Dropping the receiver makes every send to this subscriber fail.
        drop(rx_failing);

        let report = registry.fanout("snapshot-1");
        assert_eq!(report.delivered, 1);
        assert_eq!(report.pruned, 1);
        assert_eq!(registry.len(), 1);

        // The healthy subscriber got exactly one frame.
        assert_eq!(rx_healthy.try_recv().unwrap(), "snapshot-1");
        assert!(rx_healthy.try_recv().is_err());
    }

    #[test]
    fn unsubscribe_removes_only_the_given_subscriber() {
        let registry = SubscriberRegistry::new();
        let (id_a, _rx_a) = registry.subscribe();
        let (_id_b, _rx_b) = registry.subscribe();
        assert_eq!(registry.len(), 2);

        registry.unsubscribe(id_a);
        assert_eq!(registry.len(), 1);

        // Unsubscribing twice is harmless.
        registry.unsubscribe(id_a);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn slow_subscriber_is_pruned_when_its_queue_fills() {
        let registry = SubscriberRegistry::new();
        let (_id, _rx) = registry.subscribe();

        // Never drain the queue; eventually try_send fails and the
        // subscriber is dropped.
        let mut pruned = 0_usize;
        for _ in 0..=SUBSCRIBER_QUEUE_CAPACITY {
            pruned = pruned.saturating_add(registry.fanout("frame").pruned);
        }
        assert_eq!(pruned, 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn ids_are_unique_across_subscriptions() {
        let registry = SubscriberRegistry::new();
        let (id_a, _rx_a) = registry.subscribe();
        let (id_b, _rx_b) = registry.subscribe();
        assert_ne!(id_a, id_b);
    }
}
