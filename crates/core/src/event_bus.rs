// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process publish/subscribe fan-out with bounded, per-subscriber queues
//! and a drop policy (spec.md §4.7).

use crate::event::Event;
use crate::instance::InstanceId;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Which events a subscription receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventFilter {
    /// Every event published on the bus.
    All,
    /// Only events concerning one instance.
    Instance(InstanceId),
}

impl EventFilter {
    fn matches(&self, event: &Event) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Instance(id) => event.instance_id() == id,
        }
    }
}

/// What happens to a new event when a subscriber's queue is already full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPolicy {
    /// Drop the incoming event; the queue keeps its oldest entries.
    /// Used for `output` subscriptions (spec.md §4.7).
    DropNewest,
    /// Evict the oldest queued event to make room for the incoming one.
    /// Used for `state` subscriptions, so state history is less lossy than
    /// output (spec.md §4.7).
    DropOldest,
}

struct SubQueue {
    queue: parking_lot::Mutex<VecDeque<Event>>,
    notify: Notify,
    capacity: usize,
    policy: DropPolicy,
    filter: EventFilter,
    dropped: AtomicU64,
}

impl SubQueue {
    fn push(&self, event: Event) {
        let mut queue = self.queue.lock();
        if queue.len() >= self.capacity {
            match self.policy {
                DropPolicy::DropNewest => {
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                    return;
                }
                DropPolicy::DropOldest => {
                    queue.pop_front();
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
        queue.push_back(event);
        drop(queue);
        self.notify.notify_one();
    }
}

struct BusInner {
    next_id: AtomicU64,
    subscribers: parking_lot::Mutex<HashMap<u64, Arc<SubQueue>>>,
}

/// Fan-out event bus. Cheap to clone; all clones share the same subscriber
/// registry.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self { inner: Arc::new(BusInner { next_id: AtomicU64::new(1), subscribers: parking_lot::Mutex::new(HashMap::new()) }) }
    }

    /// Publish an event to every matching subscriber.
    ///
    /// All subscribers of an instance observe that instance's events in the
    /// order they were published, because delivery to every subscriber
    /// happens while holding the registry lock for this call (spec.md §4.7,
    /// §5 ordering guarantees).
    pub fn publish(&self, event: Event) {
        let subscribers = self.inner.subscribers.lock();
        for sub in subscribers.values() {
            if sub.filter.matches(&event) {
                sub.push(event.clone());
            }
        }
    }

    pub fn subscribe(&self, filter: EventFilter, capacity: usize, policy: DropPolicy) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let queue = Arc::new(SubQueue {
            queue: parking_lot::Mutex::new(VecDeque::with_capacity(capacity.max(1))),
            notify: Notify::new(),
            capacity: capacity.max(1),
            policy,
            filter,
            dropped: AtomicU64::new(0),
        });
        self.inner.subscribers.lock().insert(id, queue.clone());
        Subscription { id, bus: self.clone(), queue }
    }

    fn unsubscribe(&self, id: u64) {
        self.inner.subscribers.lock().remove(&id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }
}

/// A live subscription. Dropping it unsubscribes synchronously: once `drop`
/// returns, `publish` can no longer deliver to it (spec.md §4.7).
pub struct Subscription {
    id: u64,
    bus: EventBus,
    queue: Arc<SubQueue>,
}

impl Subscription {
    /// Wait for and return the next matching event.
    pub async fn recv(&self) -> Event {
        loop {
            if let Some(event) = self.queue.queue.lock().pop_front() {
                return event;
            }
            self.queue.notify.notified().await;
        }
    }

    /// Non-blocking poll for the next event, if any is already queued.
    pub fn try_recv(&self) -> Option<Event> {
        self.queue.queue.lock().pop_front()
    }

    pub fn dropped_count(&self) -> u64 {
        self.queue.dropped.load(Ordering::Relaxed)
    }

    /// Explicit, synchronous unsubscribe (also happens on drop).
    pub fn unsubscribe(self) {
        self.bus.unsubscribe(self.id);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.id);
    }
}

#[cfg(test)]
#[path = "event_bus_tests.rs"]
mod tests;
