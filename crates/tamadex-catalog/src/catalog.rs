//! Read-only lookup over a loaded dataset.
//!
//! All queries preserve dataset order and report misses as `None` or an
//! empty `Vec`; nothing here returns an error.

use crate::{
    error::Result,
    loader::DatasetLoader,
    model::{Category, Character, Dataset, Entity, Item},
};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tamadex_core::{CategoryId, Rarity};
use tracing::info;

static NEXT_CATALOG_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
struct Indexed {
    id: u64,
    dataset: Dataset,
    items: HashMap<String, usize>,
    characters: HashMap<String, usize>,
    categories: HashMap<String, usize>,
}

/// In-memory catalog of items, characters and categories.
///
/// Cloning is cheap; clones share the same immutable dataset.
#[derive(Debug, Clone)]
pub struct Catalog {
    inner: Arc<Indexed>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(Dataset::default())
    }
}

impl Catalog {
    /// Build a catalog over an already loaded dataset.
    #[must_use]
    pub fn new(dataset: Dataset) -> Self {
        fn index<T>(records: &[T], id: impl Fn(&T) -> &str) -> HashMap<String, usize> {
            records
                .iter()
                .enumerate()
                .map(|(position, record)| (id(record).to_string(), position))
                .collect()
        }

        let items = index(&dataset.items, |i| i.id.as_str());
        let characters = index(&dataset.characters, |c| c.id.as_str());
        let categories = index(&dataset.categories, |c| c.id.as_str());

        Self {
            inner: Arc::new(Indexed {
                id: NEXT_CATALOG_ID.fetch_add(1, Ordering::Relaxed),
                dataset,
                items,
                characters,
                categories,
            }),
        }
    }

    /// Load the dataset through `loader` and build a catalog over it.
    ///
    /// # Errors
    /// Returns error if loading fails.
    pub fn load_from(loader: &DatasetLoader) -> Result<Self> {
        let catalog = Self::new(loader.load()?);
        info!(
            items = catalog.items().len(),
            characters = catalog.characters().len(),
            "catalog ready"
        );
        Ok(catalog)
    }

    /// Process-unique identity shared by all clones of this catalog.
    ///
    /// Two separately built catalogs never share an identity, even when
    /// their datasets are equal.
    #[must_use]
    pub fn identity(&self) -> u64 {
        self.inner.id
    }

    /// The underlying dataset.
    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.inner.dataset
    }

    /// All items in dataset order.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.inner.dataset.items
    }

    /// All characters in dataset order.
    #[must_use]
    pub fn characters(&self) -> &[Character] {
        &self.inner.dataset.characters
    }

    /// All categories in dataset order.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.inner.dataset.categories
    }

    /// Get an item by exact id.
    #[must_use]
    pub fn get_item(&self, id: &str) -> Option<&Item> {
        self.inner
            .items
            .get(id)
            .map(|&position| &self.inner.dataset.items[position])
    }

    /// Get a character by exact id.
    ///
    /// Names are never consulted; use [`get_character_by_name`](Self::get_character_by_name)
    /// for that.
    #[must_use]
    pub fn get_character(&self, id: &str) -> Option<&Character> {
        self.inner
            .characters
            .get(id)
            .map(|&position| &self.inner.dataset.characters[position])
    }

    /// Get the first character whose name matches exactly.
    #[must_use]
    pub fn get_character_by_name(&self, name: &str) -> Option<&Character> {
        self.characters().iter().find(|c| c.name == name)
    }

    /// Get a category by id.
    #[must_use]
    pub fn get_category(&self, id: &str) -> Option<&Category> {
        self.inner
            .categories
            .get(id)
            .map(|&position| &self.inner.dataset.categories[position])
    }

    /// Get an entity by exact id, items first.
    #[must_use]
    pub fn get_by_id(&self, id: &str) -> Option<Entity<'_>> {
        self.get_item(id)
            .map(Entity::Item)
            .or_else(|| self.get_character(id).map(Entity::Character))
    }

    /// Items in a category, in dataset order.
    ///
    /// Unknown categories yield an empty list.
    #[must_use]
    pub fn items_by_category(&self, category: &str) -> Vec<&Item> {
        self.items()
            .iter()
            .filter(|item| item.category.as_str() == category)
            .collect()
    }

    /// Characters of a given rarity, in dataset order.
    #[must_use]
    pub fn characters_by_rarity(&self, rarity: Rarity) -> Vec<&Character> {
        self.characters()
            .iter()
            .filter(|c| c.rarity == rarity)
            .collect()
    }

    /// Items a character likes, in dataset order. Unknown ids are ignored.
    #[must_use]
    pub fn favorite_items_of(&self, character: &Character) -> Vec<&Item> {
        self.items()
            .iter()
            .filter(|item| character.favorite_item_ids.contains(&item.id))
            .collect()
    }

    /// Items whose id is in `ids`, in dataset order.
    ///
    /// Used to join a favorites set with the catalog.
    #[must_use]
    pub fn items_with_ids<S: AsRef<str>>(&self, ids: &[S]) -> Vec<&Item> {
        let wanted: std::collections::HashSet<&str> = ids.iter().map(|id| id.as_ref()).collect();
        self.items()
            .iter()
            .filter(|item| wanted.contains(item.id.as_str()))
            .collect()
    }

    /// Characters whose id is in `ids`, in dataset order.
    #[must_use]
    pub fn characters_with_ids<S: AsRef<str>>(&self, ids: &[S]) -> Vec<&Character> {
        let wanted: std::collections::HashSet<&str> = ids.iter().map(|id| id.as_ref()).collect();
        self.characters()
            .iter()
            .filter(|c| wanted.contains(c.id.as_str()))
            .collect()
    }

    /// Item count per category, in category order.
    ///
    /// Every known category is present (possibly with zero); items whose
    /// category is not declared are counted under their own id at the end.
    #[must_use]
    pub fn count_by_category(&self) -> IndexMap<CategoryId, usize> {
        let mut counts: IndexMap<CategoryId, usize> = self
            .categories()
            .iter()
            .map(|c| (c.id.clone(), 0))
            .collect();

        for item in self.items() {
            *counts.entry(item.category.clone()).or_insert(0) += 1;
        }

        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexSet;
    use tamadex_core::EntityId;

    fn item(id: &str, category: &str) -> Item {
        Item {
            id: EntityId::new(id).expect("valid id"),
            name: format!("Item {id}"),
            item_code: id.to_uppercase(),
            category: CategoryId::new(category).expect("valid category"),
            sprite_url: String::new(),
            qr_code_url: String::new(),
        }
    }

    fn character(id: &str, name: &str, rarity: Rarity, likes: &[&str]) -> Character {
        Character {
            id: EntityId::new(id).expect("valid id"),
            name: name.to_string(),
            description: String::new(),
            sprite_url: String::new(),
            favorite_item_ids: likes
                .iter()
                .map(|id| EntityId::new(*id).expect("valid id"))
                .collect::<IndexSet<_>>(),
            preferred_categories: IndexSet::new(),
            rarity,
            evolves_from: None,
            evolves_to: Vec::new(),
        }
    }

    fn category(id: &str) -> Category {
        Category {
            id: CategoryId::new(id).expect("valid category"),
            name: id.to_string(),
            color: "#000000".to_string(),
            icon: "star".to_string(),
            icon_family: "Ionicons".to_string(),
        }
    }

    fn sample_catalog() -> Catalog {
        Catalog::new(Dataset {
            items: vec![item("a", "c1"), item("b", "c2"), item("c", "c1")],
            characters: vec![
                character("1", "Mametchi", Rarity::Rare, &["c", "a", "zzz"]),
                character("2", "1", Rarity::Common, &[]),
            ],
            categories: vec![category("c1"), category("c2"), category("c3")],
        })
    }

    #[test]
    fn test_get_item() {
        let catalog = sample_catalog();
        assert_eq!(catalog.get_item("b").map(|i| i.name.as_str()), Some("Item b"));
        assert!(catalog.get_item("missing").is_none());
    }

    #[test]
    fn test_get_character_is_strict() {
        let catalog = sample_catalog();
        // Character "2" is named "1"; id lookup must not match on names
        let found = catalog.get_character("1").expect("character 1");
        assert_eq!(found.name, "Mametchi");
        assert!(catalog.get_character("Mametchi").is_none());
        assert_eq!(
            catalog
                .get_character_by_name("Mametchi")
                .map(|c| c.id.as_str()),
            Some("1")
        );
    }

    #[test]
    fn test_get_by_id() {
        let catalog = sample_catalog();
        assert!(matches!(catalog.get_by_id("a"), Some(Entity::Item(_))));
        assert!(matches!(catalog.get_by_id("2"), Some(Entity::Character(_))));
        assert!(catalog.get_by_id("nope").is_none());
    }

    #[test]
    fn test_items_by_category_preserves_order() {
        let catalog = sample_catalog();
        let ids: Vec<&str> = catalog
            .items_by_category("c1")
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(catalog.items_by_category("unknown").is_empty());
    }

    #[test]
    fn test_category_counts_sum_to_total() {
        let catalog = sample_catalog();
        let total: usize = catalog
            .categories()
            .iter()
            .map(|c| catalog.items_by_category(c.id.as_str()).len())
            .sum();
        assert_eq!(total, catalog.items().len());

        let counts = catalog.count_by_category();
        assert_eq!(counts.values().sum::<usize>(), catalog.items().len());
        assert_eq!(counts.get(&CategoryId::new("c3").expect("valid")), Some(&0));
    }

    #[test]
    fn test_characters_by_rarity() {
        let catalog = sample_catalog();
        assert_eq!(catalog.characters_by_rarity(Rarity::Rare).len(), 1);
        assert!(catalog.characters_by_rarity(Rarity::Legendary).is_empty());
    }

    #[test]
    fn test_favorite_items_of_uses_dataset_order() {
        let catalog = sample_catalog();
        let mametchi = catalog.get_character("1").expect("character 1");
        let ids: Vec<&str> = catalog
            .favorite_items_of(mametchi)
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_items_with_ids() {
        let catalog = sample_catalog();
        let ids: Vec<&str> = catalog
            .items_with_ids(&["c", "a", "ghost"])
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(catalog.characters_with_ids(&["2".to_string()]).len(), 1);
    }
}
