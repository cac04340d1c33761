//! The favorites store.
//!
//! Reads and toggles work on an in-memory set and never wait for storage.
//! Every mutation bumps a generation counter and publishes a snapshot of
//! the whole set to a single background writer, which persists only the
//! newest snapshot it has not written yet. Writes for one store are
//! therefore serialized, and a slow write can never overwrite a newer
//! state with an older one.

use crate::{
    domain::FavoritesDomain,
    error::{FavoritesError, Result},
    event::{FavoritesEvent, SubscriberList, Subscription},
    writer::Writer,
};
use indexmap::IndexSet;
use std::sync::{Arc, RwLock};
use tamadex_db::KeyValueStore;
use tokio::sync::watch;
use tracing::{debug, info};

/// Full copy of a favorites set at one generation.
#[derive(Debug, Clone, Default)]
pub(crate) struct Snapshot {
    pub(crate) generation: u64,
    pub(crate) ids: Arc<Vec<String>>,
}

/// A mutation made before the stored set was read.
#[derive(Debug)]
enum PendingOp {
    Toggle(String),
    Clear,
}

#[derive(Debug, Default)]
struct State {
    ids: IndexSet<String>,
    generation: u64,
    hydrated: bool,
    pending: Vec<PendingOp>,
}

impl State {
    /// Flip membership of `id`, returning whether it is now a favorite.
    fn flip(&mut self, id: &str) -> bool {
        if self.ids.shift_remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    fn apply(&mut self, op: &PendingOp) {
        match op {
            PendingOp::Toggle(id) => {
                self.flip(id);
            }
            PendingOp::Clear => self.ids.clear(),
        }
    }

    /// Record a mutation, returning the snapshot to persist if any.
    fn commit(&mut self, op: PendingOp) -> Option<Snapshot> {
        self.generation += 1;
        if self.hydrated {
            Some(self.snapshot())
        } else {
            self.pending.push(op);
            None
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            generation: self.generation,
            ids: Arc::new(self.ids.iter().cloned().collect()),
        }
    }
}

pub(crate) struct Shared {
    domain: FavoritesDomain,
    state: RwLock<State>,
    subscribers: SubscriberList,
    snapshots: watch::Sender<Snapshot>,
    persisted: watch::Receiver<u64>,
    hydrated: watch::Receiver<bool>,
}

impl Shared {
    /// Hand a snapshot to the writer unless it already holds a newer one.
    fn publish(&self, snapshot: Snapshot) {
        self.snapshots.send_if_modified(|current| {
            if snapshot.generation > current.generation {
                *current = snapshot;
                true
            } else {
                false
            }
        });
    }

    /// Install the stored set, replaying any toggles made while it loaded.
    pub(crate) fn hydrate(&self, stored: Vec<String>) {
        let (count, replayed, snapshot) = {
            let mut state = self.state.write().expect("favorites lock poisoned");
            let pending = std::mem::take(&mut state.pending);

            state.ids = stored.into_iter().collect();
            for op in &pending {
                state.apply(op);
            }
            state.hydrated = true;

            let snapshot = (!pending.is_empty()).then(|| state.snapshot());
            (state.ids.len(), pending.len(), snapshot)
        };

        info!(domain = %self.domain, count, replayed, "favorites hydrated");

        if let Some(snapshot) = snapshot {
            self.publish(snapshot);
        }
        self.subscribers.notify(&FavoritesEvent::Hydrated { count });
    }
}

/// Favorited ids of one [`FavoritesDomain`], backed by durable storage.
///
/// Cloning is cheap; clones share state, subscribers and the writer.
#[derive(Clone)]
pub struct FavoritesStore {
    shared: Arc<Shared>,
}

impl FavoritesStore {
    /// Open the store for `domain` and start loading its stored set.
    ///
    /// The store is usable immediately. Until the stored set has been read,
    /// it starts empty and [`is_favorite`](Self::is_favorite) reports
    /// `false` for ids that are not toggled in the meantime.
    ///
    /// # Errors
    /// Returns `FavoritesError::NoRuntime` when called outside a Tokio runtime.
    pub fn open(domain: FavoritesDomain, storage: Arc<dyn KeyValueStore>) -> Result<Self> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| FavoritesError::NoRuntime)?;

        let (snapshots_tx, snapshots_rx) = watch::channel(Snapshot::default());
        let (persisted_tx, persisted_rx) = watch::channel(0_u64);
        let (hydrated_tx, hydrated_rx) = watch::channel(false);

        let shared = Arc::new(Shared {
            domain,
            state: RwLock::new(State::default()),
            subscribers: SubscriberList::default(),
            snapshots: snapshots_tx,
            persisted: persisted_rx,
            hydrated: hydrated_rx,
        });

        let writer = Writer {
            domain,
            storage,
            shared: Arc::downgrade(&shared),
            snapshots: snapshots_rx,
            persisted: persisted_tx,
            hydrated: hydrated_tx,
        };
        runtime.spawn(writer.run());

        debug!(domain = %domain, key = domain.storage_key(), "favorites store opened");
        Ok(Self { shared })
    }

    /// Domain this store tracks.
    #[must_use]
    pub fn domain(&self) -> FavoritesDomain {
        self.shared.domain
    }

    fn state(&self) -> std::sync::RwLockReadGuard<'_, State> {
        self.shared.state.read().expect("favorites lock poisoned")
    }

    /// Whether `id` is currently a favorite. Never touches storage.
    #[must_use]
    pub fn is_favorite(&self, id: &str) -> bool {
        self.state().ids.contains(id)
    }

    /// Current favorites in insertion order.
    #[must_use]
    pub fn favorites(&self) -> Vec<String> {
        self.state().ids.iter().cloned().collect()
    }

    /// Number of favorites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state().ids.len()
    }

    /// Whether there are no favorites.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state().ids.is_empty()
    }

    /// Whether the stored set has been read.
    #[must_use]
    pub fn is_hydrated(&self) -> bool {
        self.state().hydrated
    }

    /// Flip membership of `id` and return whether it is now a favorite.
    ///
    /// The change is visible to readers and subscribers before this returns;
    /// persistence happens in the background.
    pub fn toggle(&self, id: &str) -> bool {
        let (favorite, snapshot) = {
            let mut state = self.shared.state.write().expect("favorites lock poisoned");
            let favorite = state.flip(id);
            let snapshot = state.commit(PendingOp::Toggle(id.to_string()));
            (favorite, snapshot)
        };

        debug!(domain = %self.shared.domain, id, favorite, "toggled favorite");

        if let Some(snapshot) = snapshot {
            self.shared.publish(snapshot);
        }

        let event = if favorite {
            FavoritesEvent::Added(id.to_string())
        } else {
            FavoritesEvent::Removed(id.to_string())
        };
        self.shared.subscribers.notify(&event);

        favorite
    }

    /// Remove every favorite, returning how many were removed.
    ///
    /// Before hydration the count covers only ids toggled in memory; the
    /// stored set is emptied once it has been read. Clearing an empty,
    /// hydrated set does nothing and notifies no one.
    pub fn clear(&self) -> usize {
        let (removed, snapshot) = {
            let mut state = self.shared.state.write().expect("favorites lock poisoned");
            let removed = state.ids.len();
            if removed == 0 && state.hydrated {
                return 0;
            }
            state.ids.clear();
            (removed, state.commit(PendingOp::Clear))
        };

        info!(domain = %self.shared.domain, removed, "cleared favorites");

        if let Some(snapshot) = snapshot {
            self.shared.publish(snapshot);
        }
        self.shared.subscribers.notify(&FavoritesEvent::Cleared);

        removed
    }

    /// Register `callback` for every change to this store.
    ///
    /// Callbacks run synchronously on the thread that made the change, after
    /// the in-memory set has been updated. Hydration events run on the
    /// background writer.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&FavoritesEvent) + Send + Sync + 'static,
    {
        self.shared.subscribers.add(Arc::new(callback))
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.shared.subscribers.len()
    }

    /// Wait until the stored set has been read.
    ///
    /// # Errors
    /// Returns `FavoritesError::WriterStopped` if the background writer is gone.
    pub async fn wait_until_hydrated(&self) -> Result<()> {
        let mut hydrated = self.shared.hydrated.clone();
        hydrated
            .wait_for(|done| *done)
            .await
            .map(|_| ())
            .map_err(|_| FavoritesError::WriterStopped)
    }

    /// Wait until the state as of this call has been handed to storage.
    ///
    /// Write failures are logged by the writer and do not fail the flush.
    ///
    /// # Errors
    /// Returns `FavoritesError::WriterStopped` if the background writer is gone.
    pub async fn flush(&self) -> Result<()> {
        let target = self.state().generation;
        let mut persisted = self.shared.persisted.clone();
        persisted
            .wait_for(|generation| *generation >= target)
            .await
            .map(|_| ())
            .map_err(|_| FavoritesError::WriterStopped)
    }
}

impl std::fmt::Debug for FavoritesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("FavoritesStore")
            .field("domain", &self.shared.domain)
            .field("len", &state.ids.len())
            .field("generation", &state.generation)
            .field("hydrated", &state.hydrated)
            .finish_non_exhaustive()
    }
}
