//! Ordered event publication with an observation tap.
//!
//! Automation itself runs synchronously inside the engine; the bus's job is
//! to stamp each event with a strictly monotonic sequence number as it is
//! processed and fan it out to any subscribed observers, so observers see the
//! same causal order the engine used (a triggering event always precedes the
//! events its rules caused).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::automation::event::LifecycleEvent;

static NEXT_SEQ: AtomicU64 = AtomicU64::new(1);

/// Generate the next global sequence number. Strictly monotonic.
fn next_seq() -> u64 {
    NEXT_SEQ.fetch_add(1, Ordering::SeqCst)
}

/// An event as observed on the bus.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedEvent {
    /// Position in the total event order.
    pub seq: u64,
    pub event: LifecycleEvent,
    pub published_at: DateTime<Utc>,
}

/// Fan-out point for processed lifecycle events.
#[derive(Default)]
pub struct LifecycleEventBus {
    subscribers: Mutex<Vec<Sender<PublishedEvent>>>,
}

impl LifecycleEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer. The channel is unbounded so publication never
    /// blocks; a dropped receiver is pruned on the next publish.
    pub fn subscribe(&self) -> Receiver<PublishedEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().unwrap().push(tx);
        rx
    }

    /// Stamp the event and deliver it to all live subscribers. Returns the
    /// assigned sequence number.
    pub fn publish(&self, event: &LifecycleEvent) -> u64 {
        let published = PublishedEvent {
            seq: next_seq(),
            event: event.clone(),
            published_at: Utc::now(),
        };
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|tx| tx.send(published.clone()).is_ok());
        published.seq
    }

    /// Number of live subscribers (for diagnostics).
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }
}
