use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tamadex_db::{Database, DatabaseError, KeyValueStore, MemoryStore, SqliteStore};
use tamadex_favorites::{FavoritesDomain, FavoritesStore};
use tempfile::TempDir;

/// Store whose reads and/or writes always fail.
struct FailingStore {
    fail_reads: bool,
    fail_writes: bool,
    inner: MemoryStore,
}

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, key: &str) -> tamadex_db::Result<Option<String>> {
        if self.fail_reads {
            return Err(DatabaseError::Unavailable("read refused".to_string()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> tamadex_db::Result<()> {
        if self.fail_writes {
            return Err(DatabaseError::Unavailable("write refused".to_string()));
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> tamadex_db::Result<()> {
        self.inner.remove(key).await
    }
}

/// Store that records every write and yields while writing.
#[derive(Default)]
struct RecordingStore {
    writes: Mutex<Vec<(String, String)>>,
    inner: MemoryStore,
}

#[async_trait]
impl KeyValueStore for RecordingStore {
    async fn get(&self, key: &str) -> tamadex_db::Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> tamadex_db::Result<()> {
        self.writes
            .lock()
            .expect("writes lock")
            .push((key.to_string(), value.to_string()));
        tokio::task::yield_now().await;
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> tamadex_db::Result<()> {
        self.inner.remove(key).await
    }
}

async fn stored(storage: &dyn KeyValueStore, key: &str) -> Option<Vec<String>> {
    storage
        .get(key)
        .await
        .expect("read storage")
        .map(|raw| serde_json::from_str(&raw).expect("stored JSON array"))
}

#[tokio::test]
async fn test_read_failure_starts_empty() {
    let storage = Arc::new(FailingStore {
        fail_reads: true,
        fail_writes: false,
        inner: MemoryStore::with_entries([("tama_favorites", r#"["x"]"#)]),
    });
    let store = FavoritesStore::open(FavoritesDomain::Items, storage).expect("open favorites");

    store.wait_until_hydrated().await.expect("hydrate");
    assert!(store.is_hydrated());
    assert!(store.is_empty());
    assert!(!store.is_favorite("x"));
}

#[tokio::test]
async fn test_write_failure_keeps_memory_state() {
    let storage = Arc::new(FailingStore {
        fail_reads: false,
        fail_writes: true,
        inner: MemoryStore::new(),
    });
    let store = FavoritesStore::open(FavoritesDomain::Items, Arc::clone(&storage) as _)
        .expect("open favorites");
    store.wait_until_hydrated().await.expect("hydrate");

    assert!(store.toggle("a"));
    store.flush().await.expect("flush completes despite write failure");

    assert!(store.is_favorite("a"));
    assert_eq!(stored(&storage.inner, "tama_favorites").await, None);
}

#[tokio::test]
async fn test_rapid_toggles_persist_latest_snapshot() {
    let storage = Arc::new(RecordingStore::default());
    let store = FavoritesStore::open(FavoritesDomain::Items, Arc::clone(&storage) as _)
        .expect("open favorites");
    store.wait_until_hydrated().await.expect("hydrate");

    // No await between toggles: the writer only ever sees the last state
    store.toggle("a");
    store.toggle("b");
    store.toggle("c");
    store.toggle("a");
    store.flush().await.expect("flush");

    let writes = storage.writes.lock().expect("writes lock").clone();
    assert_eq!(
        writes,
        vec![("tama_favorites".to_string(), r#"["b","c"]"#.to_string())]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_interleaved_toggles_converge() {
    let storage = Arc::new(RecordingStore::default());
    let store = FavoritesStore::open(FavoritesDomain::Items, Arc::clone(&storage) as _)
        .expect("open favorites");
    store.wait_until_hydrated().await.expect("hydrate");

    for round in 0..50 {
        store.toggle(&format!("id-{}", round % 7));
        if round % 5 == 0 {
            tokio::task::yield_now().await;
        }
    }
    store.flush().await.expect("flush");

    let persisted = stored(&*storage, "tama_favorites")
        .await
        .expect("favorites persisted");
    assert_eq!(persisted, store.favorites());
}

#[tokio::test]
async fn test_domains_are_independent() {
    let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let items = FavoritesStore::open(FavoritesDomain::Items, Arc::clone(&storage))
        .expect("open item favorites");
    let characters = FavoritesStore::open(FavoritesDomain::Characters, Arc::clone(&storage))
        .expect("open character favorites");
    items.wait_until_hydrated().await.expect("hydrate items");
    characters
        .wait_until_hydrated()
        .await
        .expect("hydrate characters");

    items.toggle("shared-id");
    assert!(items.is_favorite("shared-id"));
    assert!(!characters.is_favorite("shared-id"));

    characters.toggle("mametchi");
    items.flush().await.expect("flush items");
    characters.flush().await.expect("flush characters");

    assert_eq!(
        stored(&*storage, "tama_favorites").await,
        Some(vec!["shared-id".to_string()])
    );
    assert_eq!(
        stored(&*storage, "tama_favorite_characters").await,
        Some(vec!["mametchi".to_string()])
    );
}

#[tokio::test]
async fn test_favorites_survive_restart_with_sqlite() {
    let tmp = TempDir::new().expect("create temp dir");
    let path = tmp.path().join("favorites.db");

    {
        let db = Database::open(&path).await.expect("open database");
        let store = FavoritesStore::open(
            FavoritesDomain::Characters,
            Arc::new(SqliteStore::new(db.clone())),
        )
        .expect("open favorites");
        store.wait_until_hydrated().await.expect("hydrate");
        store.toggle("tama-3");
        store.toggle("tama-1");
        store.flush().await.expect("flush");
        drop(store);
        db.close().await;
    }

    let db = Database::open(&path).await.expect("reopen database");
    let store = FavoritesStore::open(FavoritesDomain::Characters, Arc::new(SqliteStore::new(db)))
        .expect("reopen favorites");
    store.wait_until_hydrated().await.expect("hydrate");

    assert_eq!(store.favorites(), vec!["tama-3", "tama-1"]);
}
