//! Change notifications and subscriptions.

use serde::Serialize;
use std::sync::{Arc, Mutex, Weak};

/// A change to a favorites set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum FavoritesEvent {
    /// An id became a favorite
    Added(String),
    /// An id stopped being a favorite
    Removed(String),
    /// Every id was removed
    Cleared,
    /// The stored set was loaded
    Hydrated {
        /// Favorites after loading (including replayed toggles)
        count: usize,
    },
}

pub(crate) type Callback = Arc<dyn Fn(&FavoritesEvent) + Send + Sync>;

#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: u64,
    entries: Vec<(u64, Callback)>,
}

/// Registry of change callbacks.
#[derive(Default)]
pub(crate) struct SubscriberList {
    inner: Arc<Mutex<Subscribers>>,
}

impl SubscriberList {
    pub(crate) fn add(&self, callback: Callback) -> Subscription {
        let mut subscribers = self.inner.lock().expect("subscribers lock poisoned");
        let id = subscribers.next_id;
        subscribers.next_id += 1;
        subscribers.entries.push((id, callback));

        Subscription {
            id,
            list: Arc::downgrade(&self.inner),
        }
    }

    /// Call every subscriber with `event`, in registration order.
    ///
    /// The list is copied first so callbacks may subscribe or unsubscribe.
    pub(crate) fn notify(&self, event: &FavoritesEvent) {
        let callbacks: Vec<Callback> = self
            .inner
            .lock()
            .expect("subscribers lock poisoned")
            .entries
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in callbacks {
            callback(event);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("subscribers lock poisoned")
            .entries
            .len()
    }
}

/// Handle returned by [`FavoritesStore::subscribe`](crate::FavoritesStore::subscribe).
///
/// The callback stays registered until this handle is dropped.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    list: Weak<Mutex<Subscribers>>,
}

impl Subscription {
    /// Stop receiving events.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(list) = self.list.upgrade() {
            if let Ok(mut subscribers) = list.lock() {
                subscribers.entries.retain(|(id, _)| *id != self.id);
            }
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
