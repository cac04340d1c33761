//! Application state management.

use crate::error::{AppError, Result};
use std::sync::Arc;
use tamadex_catalog::{Catalog, Character, DataCache, DatasetLoader, Item, SearchService};
use tamadex_core::AppConfig;
use tamadex_db::{Database, KeyValueStore, SqliteStore};
use tamadex_favorites::{FavoritesDomain, FavoritesStore};
use tracing::info;

/// Everything the presentation layer talks to.
pub struct AppState {
    /// Effective configuration
    pub config: AppConfig,
    /// Loaded catalog
    pub catalog: Catalog,
    /// Search over `catalog`
    pub search: SearchService,
    /// Favorited items
    pub item_favorites: FavoritesStore,
    /// Favorited characters
    pub character_favorites: FavoritesStore,
    database: Option<Database>,
}

impl AppState {
    /// Load the dataset, open the favorites database and both stores.
    ///
    /// A missing or malformed dataset aborts start-up; favorites are
    /// loaded in the background.
    pub async fn init(config: AppConfig) -> Result<Self> {
        let loader = DatasetLoader::from_config(&config.data)?;
        let catalog = Catalog::load_from(&loader)?;

        let database_path = config.database_path()?;
        let database = Database::open(&database_path).await?;
        info!(path = %database_path.display(), "favorites database ready");

        let storage: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::new(database.clone()));
        let mut state = Self::assemble(config, catalog, storage)?;
        state.database = Some(database);
        Ok(state)
    }

    /// Build state from an already loaded catalog and any storage backend.
    pub fn assemble(
        config: AppConfig,
        catalog: Catalog,
        storage: Arc<dyn KeyValueStore>,
    ) -> Result<Self> {
        let search = SearchService::new(catalog.clone(), DataCache::new());
        let item_favorites = FavoritesStore::open(FavoritesDomain::Items, Arc::clone(&storage))?;
        let character_favorites = FavoritesStore::open(FavoritesDomain::Characters, storage)?;

        Ok(Self {
            config,
            catalog,
            search,
            item_favorites,
            character_favorites,
            database: None,
        })
    }

    /// Favorites store for `domain`.
    #[must_use]
    pub fn favorites(&self, domain: FavoritesDomain) -> &FavoritesStore {
        match domain {
            FavoritesDomain::Items => &self.item_favorites,
            FavoritesDomain::Characters => &self.character_favorites,
        }
    }

    /// Wait until both favorites stores have read their stored sets.
    pub async fn wait_until_hydrated(&self) -> Result<()> {
        self.item_favorites.wait_until_hydrated().await?;
        self.character_favorites.wait_until_hydrated().await?;
        Ok(())
    }

    /// Item search under the configured item policy.
    #[must_use]
    pub fn search_items(&self, query: &str) -> Vec<&Item> {
        self.search.search_items(query, &self.config.search.items)
    }

    /// Character filter under the configured character policy.
    #[must_use]
    pub fn search_characters(&self, query: &str) -> Vec<&Character> {
        self.search
            .search_characters(query, &self.config.search.characters)
    }

    /// Favorited items, in dataset order.
    ///
    /// Stored ids that no longer exist in the dataset are skipped.
    #[must_use]
    pub fn favorite_items(&self) -> Vec<&Item> {
        self.catalog
            .items_with_ids(&self.item_favorites.favorites())
    }

    /// Favorited characters, in dataset order.
    #[must_use]
    pub fn favorite_characters(&self) -> Vec<&Character> {
        self.catalog
            .characters_with_ids(&self.character_favorites.favorites())
    }

    /// Toggle a favorite after checking that the entity exists.
    ///
    /// Returns whether `id` is now a favorite.
    pub fn toggle_favorite(&self, domain: FavoritesDomain, id: &str) -> Result<bool> {
        let exists = match domain {
            FavoritesDomain::Items => self.catalog.get_item(id).is_some(),
            FavoritesDomain::Characters => self.catalog.get_character(id).is_some(),
        };
        if !exists {
            return Err(AppError::not_found(entity_kind(domain), id));
        }

        Ok(self.favorites(domain).toggle(id))
    }

    /// Persist pending favorites and close the database.
    pub async fn shutdown(self) -> Result<()> {
        self.item_favorites.flush().await?;
        self.character_favorites.flush().await?;

        if let Some(database) = self.database {
            database.close().await;
        }

        info!("shutdown complete");
        Ok(())
    }
}

pub(crate) fn entity_kind(domain: FavoritesDomain) -> &'static str {
    match domain {
        FavoritesDomain::Items => "item",
        FavoritesDomain::Characters => "character",
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use tamadex_db::MemoryStore;

    pub(crate) fn sample_catalog() -> Catalog {
        let document = json!({
            "categories": [
                {"id": "food", "name": "Food", "color": "#F97316", "icon": "fast-food"},
                {"id": "toys", "name": "Toys"}
            ],
            "items": [
                {"id": "cake", "name": "Strawberry Cake", "itemCode": "F-01", "category": "food"},
                {"id": "ball", "name": "Beach Ball", "itemCode": "T-01", "category": "toys"},
                {"id": "onigiri", "name": "Onigiri", "itemCode": "F-02", "category": "food"}
            ],
            "characters": [
                {"id": "mametchi", "name": "Mametchi", "description": "Inventor",
                 "preferences": {"favoriteItemIds": ["cake"], "likesItems": ["food"]},
                 "evolution": {"rarity": "rare", "evolvesTo": ["tama-1"]}},
                {"name": "Kuchipatchi", "description": "Loves cake"}
            ]
        });

        let tmp = tempfile::TempDir::new().expect("create temp dir");
        let path = tmp.path().join("dataset.json");
        std::fs::write(&path, document.to_string()).expect("write dataset");

        let loader = DatasetLoader::new(
            &path,
            tamadex_catalog::ImageResolver::mirror_only("https://mirror.test"),
        )
        .expect("create loader");
        Catalog::load_from(&loader).expect("load catalog")
    }

    pub(crate) fn sample_state(storage: Arc<dyn KeyValueStore>) -> AppState {
        AppState::assemble(AppConfig::default(), sample_catalog(), storage).expect("assemble state")
    }

    #[tokio::test]
    async fn test_toggle_requires_existing_entity() {
        let state = sample_state(Arc::new(MemoryStore::new()));
        state.wait_until_hydrated().await.expect("hydrate");

        assert!(state
            .toggle_favorite(FavoritesDomain::Items, "cake")
            .expect("toggle cake"));
        assert!(matches!(
            state.toggle_favorite(FavoritesDomain::Items, "mametchi"),
            Err(AppError::NotFound { kind: "item", .. })
        ));
        assert!(matches!(
            state.toggle_favorite(FavoritesDomain::Characters, "cake"),
            Err(AppError::NotFound {
                kind: "character",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_favorite_joins_follow_dataset_order() {
        let state = sample_state(Arc::new(MemoryStore::with_entries([(
            "tama_favorites",
            r#"["onigiri","ghost","cake"]"#,
        )])));
        state.wait_until_hydrated().await.expect("hydrate");

        let ids: Vec<&str> = state
            .favorite_items()
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(ids, vec!["cake", "onigiri"]);
        assert!(state.favorite_characters().is_empty());
    }

    #[tokio::test]
    async fn test_configured_search_policies() {
        let state = sample_state(Arc::new(MemoryStore::new()));

        // Items use the strict policy, characters browse
        assert!(state.search_items("").is_empty());
        assert!(state.search_items("c").is_empty());
        assert_eq!(state.search_items("ca").len(), 1);
        assert_eq!(state.search_characters("").len(), 2);
        assert_eq!(state.search_characters("cake").len(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_flushes_favorites() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let state = sample_state(Arc::clone(&storage));
        state.wait_until_hydrated().await.expect("hydrate");

        state
            .toggle_favorite(FavoritesDomain::Characters, "tama-1")
            .expect("toggle character");
        state.shutdown().await.expect("shutdown");

        assert_eq!(
            storage
                .get("tama_favorite_characters")
                .await
                .expect("read storage")
                .as_deref(),
            Some(r#"["tama-1"]"#)
        );
    }
}
