//! Change feed for live todo list observation.
//!
//! # Responsibility
//! - Track subscribers of the "all items" stream and their completion filter.
//! - Hand every live subscriber the newest snapshot after each write.
//! - Tell subscribers when a post-write snapshot could not be produced.
//!
//! # Invariants
//! - Each subscriber holds at most one pending snapshot; a newer publish
//!   replaces an undrained one.
//! - A new subscription receives the current snapshot before any later one.
//! - Subscribers whose handle was dropped are pruned on the next publish.

use crate::model::todo::TodoItem;
use std::cell::RefCell;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

#[derive(Debug, Default)]
struct Pending {
    snapshot: Option<Vec<TodoItem>>,
    error: Option<String>,
}

type Slot = Mutex<Pending>;

fn lock(slot: &Slot) -> MutexGuard<'_, Pending> {
    // Pending only holds plain data, so a poisoned lock is still usable.
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Receiving end of a todo list observation.
///
/// Only the newest undelivered snapshot is kept; consumers poll it with
/// [`TodoSubscription::latest`].
#[derive(Debug)]
pub struct TodoSubscription {
    completed: Option<bool>,
    slot: Arc<Slot>,
}

impl TodoSubscription {
    /// Completion filter this subscription was registered with.
    pub fn completed_filter(&self) -> Option<bool> {
        self.completed
    }

    /// Takes the pending snapshot, if any.
    pub fn latest(&self) -> Option<Vec<TodoItem>> {
        lock(&self.slot).snapshot.take()
    }

    /// Whether a snapshot is waiting to be taken.
    pub fn has_pending(&self) -> bool {
        lock(&self.slot).snapshot.is_some()
    }

    /// Takes the last refresh failure reported since the previous call.
    ///
    /// Set when a write succeeded but the list could not be re-read, so
    /// whatever this subscriber last saw is stale.
    pub fn take_error(&self) -> Option<String> {
        lock(&self.slot).error.take()
    }
}

#[derive(Debug)]
struct Subscriber {
    completed: Option<bool>,
    slot: Weak<Slot>,
}

/// Subscriber registry owned by a repository implementation.
#[derive(Debug, Default)]
pub struct TodoFeed {
    subscribers: RefCell<Vec<Subscriber>>,
}

impl TodoFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber and seeds it with `snapshot`.
    ///
    /// `snapshot` is the full unfiltered list; filtering happens here.
    pub fn subscribe(&self, completed: Option<bool>, snapshot: &[TodoItem]) -> TodoSubscription {
        let slot = Arc::new(Mutex::new(Pending {
            snapshot: Some(filter_snapshot(snapshot, completed)),
            error: None,
        }));
        self.subscribers.borrow_mut().push(Subscriber {
            completed,
            slot: Arc::downgrade(&slot),
        });
        TodoSubscription { completed, slot }
    }

    /// Replaces every live subscriber's pending snapshot, dropping dead ones.
    pub fn publish(&self, snapshot: &[TodoItem]) {
        self.subscribers.borrow_mut().retain(|subscriber| {
            let Some(slot) = subscriber.slot.upgrade() else {
                return false;
            };
            let mut pending = lock(&slot);
            pending.snapshot = Some(filter_snapshot(snapshot, subscriber.completed));
            pending.error = None;
            true
        });
    }

    /// Reports to every live subscriber that the list could not be refreshed.
    ///
    /// Any pending snapshot is left in place; it is older but still valid.
    pub fn publish_error(&self, message: &str) {
        self.subscribers.borrow_mut().retain(|subscriber| {
            let Some(slot) = subscriber.slot.upgrade() else {
                return false;
            };
            lock(&slot).error = Some(message.to_string());
            true
        });
    }

    /// Whether anyone might still be listening.
    ///
    /// Dead subscribers count until the next publish prunes them.
    pub fn has_subscribers(&self) -> bool {
        !self.subscribers.borrow().is_empty()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

fn filter_snapshot(snapshot: &[TodoItem], completed: Option<bool>) -> Vec<TodoItem> {
    snapshot
        .iter()
        .filter(|item| completed.map_or(true, |flag| item.is_completed == flag))
        .cloned()
        .collect()
}
