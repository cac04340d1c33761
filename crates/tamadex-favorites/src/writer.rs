//! Background persistence for one favorites store.

use crate::{
    domain::FavoritesDomain,
    error::{FavoritesError, Result},
    store::{Shared, Snapshot},
};
use std::sync::{Arc, Weak};
use tamadex_db::KeyValueStore;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Owns all storage access for one store.
///
/// Holds only a weak reference to the store, so dropping the last
/// `FavoritesStore` handle closes the snapshot channel and ends the task
/// once the final snapshot is written.
pub(crate) struct Writer {
    pub(crate) domain: FavoritesDomain,
    pub(crate) storage: Arc<dyn KeyValueStore>,
    pub(crate) shared: Weak<Shared>,
    pub(crate) snapshots: watch::Receiver<Snapshot>,
    pub(crate) persisted: watch::Sender<u64>,
    pub(crate) hydrated: watch::Sender<bool>,
}

impl Writer {
    pub(crate) async fn run(mut self) {
        let stored = match load(self.storage.as_ref(), self.domain).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(domain = %self.domain, error = %e, "failed to read favorites, starting empty");
                Vec::new()
            }
        };

        match self.shared.upgrade() {
            Some(shared) => shared.hydrate(stored),
            None => {
                debug!(domain = %self.domain, "favorites store dropped before hydration");
                return;
            }
        }
        self.hydrated.send_replace(true);

        while self.snapshots.changed().await.is_ok() {
            let snapshot = self.snapshots.borrow_and_update().clone();

            match save(self.storage.as_ref(), self.domain, &snapshot.ids).await {
                Ok(()) => debug!(
                    domain = %self.domain,
                    generation = snapshot.generation,
                    count = snapshot.ids.len(),
                    "persisted favorites"
                ),
                Err(e) => warn!(
                    domain = %self.domain,
                    generation = snapshot.generation,
                    error = %e,
                    "failed to persist favorites"
                ),
            }

            self.persisted.send_replace(snapshot.generation);
        }

        debug!(domain = %self.domain, "favorites writer stopped");
    }
}

/// Read the stored id list for `domain`. A missing key is an empty list.
pub(crate) async fn load(storage: &dyn KeyValueStore, domain: FavoritesDomain) -> Result<Vec<String>> {
    let key = domain.storage_key();
    let Some(raw) = storage.get(key).await? else {
        return Ok(Vec::new());
    };

    serde_json::from_str(&raw).map_err(|source| FavoritesError::Corrupt { key, source })
}

/// Store `ids` for `domain` as a JSON array.
pub(crate) async fn save(
    storage: &dyn KeyValueStore,
    domain: FavoritesDomain,
    ids: &[String],
) -> Result<()> {
    let encoded = serde_json::to_string(ids).map_err(FavoritesError::Encode)?;
    storage.set(domain.storage_key(), &encoded).await?;
    Ok(())
}
