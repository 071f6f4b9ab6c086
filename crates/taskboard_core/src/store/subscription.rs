//! Subscriber registry and unsubscribe handles.

use crate::model::document::Document;
use crate::store::{ChangeCallback, ErrorCallback, StoreError};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// Handle that keeps one collection subscription alive.
///
/// Dropping the handle tears the subscription down.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A handle with nothing to tear down.
    pub fn inert() -> Self {
        Self { cancel: None }
    }

    /// Explicitly stops delivery; equivalent to dropping the handle.
    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Snapshot outcome shared by every subscriber of one publish.
pub(crate) type Snapshot = Result<Vec<Document>, StoreError>;

/// Snapshot tagged with the write sequence it was read at.
#[derive(Clone)]
pub(crate) struct Stamped {
    seq: u64,
    snapshot: Arc<Snapshot>,
}

impl Stamped {
    pub(crate) fn seq(&self) -> u64 {
        self.seq
    }

    pub(crate) fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

#[derive(Default)]
struct Delivery {
    last_seen: u64,
    pending: Option<Stamped>,
    running: bool,
}

struct Subscriber {
    collection: String,
    on_change: ChangeCallback,
    on_error: ErrorCallback,
    delivery: Mutex<Delivery>,
}

impl Subscriber {
    /// Hands `stamped` to the callbacks unless something newer was already
    /// seen or queued.
    ///
    /// At most one thread runs this subscriber's callbacks at a time; a
    /// snapshot arriving meanwhile replaces the queued one and is drained by
    /// the running thread, so re-entrant writes from a callback never block.
    fn offer(&self, stamped: Stamped) {
        {
            let Ok(mut state) = self.delivery.lock() else {
                return;
            };
            let newest = state
                .pending
                .as_ref()
                .map_or(state.last_seen, |queued| queued.seq);
            if stamped.seq <= newest {
                return;
            }
            state.pending = Some(stamped);
            if state.running {
                return;
            }
            state.running = true;
        }

        loop {
            let next = match self.delivery.lock() {
                Ok(mut state) => match state.pending.take() {
                    Some(next) => {
                        state.last_seen = next.seq;
                        next
                    }
                    None => {
                        state.running = false;
                        return;
                    }
                },
                Err(_) => return,
            };
            match next.snapshot.as_ref() {
                Ok(documents) => (self.on_change)(documents.clone()),
                Err(err) => (self.on_error)(err),
            }
        }
    }
}

/// In-process fan-out of collection snapshots.
#[derive(Default)]
pub(crate) struct SubscriberHub {
    next_id: AtomicU64,
    next_seq: AtomicU64,
    entries: Mutex<BTreeMap<u64, Arc<Subscriber>>>,
}

impl SubscriberHub {
    /// Registers a subscriber and returns its key.
    pub(crate) fn insert(
        &self,
        collection: &str,
        on_change: ChangeCallback,
        on_error: ErrorCallback,
    ) -> u64 {
        let key = self.next_id.fetch_add(1, Ordering::Relaxed);
        let subscriber = Arc::new(Subscriber {
            collection: collection.to_string(),
            on_change,
            on_error,
            delivery: Mutex::new(Delivery::default()),
        });
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key, subscriber);
        }
        key
    }

    pub(crate) fn remove(&self, key: u64) -> bool {
        self.entries
            .lock()
            .map(|mut entries| entries.remove(&key).is_some())
            .unwrap_or(false)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Tags a snapshot with the next sequence number.
    ///
    /// Callers hold the connection lock while reading the snapshot and
    /// stamping it, so sequence order matches database state order.
    pub(crate) fn stamp(&self, snapshot: Snapshot) -> Stamped {
        Stamped {
            seq: self.next_seq.fetch_add(1, Ordering::SeqCst) + 1,
            snapshot: Arc::new(snapshot),
        }
    }

    /// Builds the handle that removes `key` from this hub.
    pub(crate) fn handle(self: &Arc<Self>, key: u64) -> Subscription {
        let hub: Weak<SubscriberHub> = Arc::downgrade(self);
        Subscription::new(move || {
            if let Some(hub) = hub.upgrade() {
                hub.remove(key);
            }
        })
    }

    /// Delivers one snapshot outcome to one subscriber.
    pub(crate) fn deliver_to(&self, key: u64, stamped: Stamped) {
        let subscriber = self
            .entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(&key).cloned());
        if let Some(subscriber) = subscriber {
            subscriber.offer(stamped);
        }
    }

    /// Delivers one snapshot outcome to every subscriber of `collection`.
    ///
    /// Callbacks run outside the registry lock so they may subscribe or
    /// unsubscribe re-entrantly.
    pub(crate) fn publish(&self, collection: &str, stamped: Stamped) {
        let targets: Vec<Arc<Subscriber>> = match self.entries.lock() {
            Ok(entries) => entries
                .values()
                .filter(|subscriber| subscriber.collection == collection)
                .cloned()
                .collect(),
            Err(_) => return,
        };
        for subscriber in targets {
            subscriber.offer(stamped.clone());
        }
    }
}
