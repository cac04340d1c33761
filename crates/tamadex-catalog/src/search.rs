//! Case-insensitive substring search over the catalog.
//!
//! How short or empty queries behave is not decided here: every call takes
//! a [`SearchPolicy`] chosen by the caller, so a browse screen and a
//! strict search screen can share one service.

use crate::{
    cache::DataCache,
    catalog::Catalog,
    model::{Character, Entity, Item},
};
use std::sync::Arc;
use tamadex_core::{BelowMinimum, SearchPolicy};
use tracing::debug;

/// Cache key prefix for memoized search results.
pub const SEARCH_CACHE_PREFIX: &str = "search:";

#[derive(Debug, Clone, Copy)]
enum Scope {
    Items,
    Characters,
}

impl Scope {
    fn as_str(self) -> &'static str {
        match self {
            Self::Items => "items",
            Self::Characters => "characters",
        }
    }
}

/// Search service over a [`Catalog`].
#[derive(Debug, Clone)]
pub struct SearchService {
    catalog: Catalog,
    cache: DataCache,
}

impl SearchService {
    /// Create a search service that memoizes results in `cache`.
    #[must_use]
    pub fn new(catalog: Catalog, cache: DataCache) -> Self {
        Self { catalog, cache }
    }

    /// Catalog being searched.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Cache holding memoized results.
    #[must_use]
    pub fn cache(&self) -> &DataCache {
        &self.cache
    }

    /// Items whose name contains `query`, ignoring case, in dataset order.
    #[must_use]
    pub fn search_items(&self, query: &str, policy: &SearchPolicy) -> Vec<&Item> {
        let items = self.catalog.items();
        match policy.short_circuit(query) {
            Some(BelowMinimum::ReturnAll) => items.iter().collect(),
            Some(BelowMinimum::ReturnNone) => Vec::new(),
            None => self
                .matching(Scope::Items, query, || {
                    let needle = normalize(query);
                    matching_ids(items, |item| item.id.as_str(), |item| {
                        contains(&item.name, &needle)
                    })
                })
                .iter()
                .filter_map(|id| self.catalog.get_item(id))
                .collect(),
        }
    }

    /// Characters whose name or description contains `query`, ignoring
    /// case, in dataset order.
    #[must_use]
    pub fn search_characters(&self, query: &str, policy: &SearchPolicy) -> Vec<&Character> {
        let characters = self.catalog.characters();
        match policy.short_circuit(query) {
            Some(BelowMinimum::ReturnAll) => characters.iter().collect(),
            Some(BelowMinimum::ReturnNone) => Vec::new(),
            None => self
                .matching(Scope::Characters, query, || {
                    let needle = normalize(query);
                    matching_ids(characters, |c| c.id.as_str(), |c| {
                        contains(&c.name, &needle) || contains(&c.description, &needle)
                    })
                })
                .iter()
                .filter_map(|id| self.catalog.get_character(id))
                .collect(),
        }
    }

    /// Items followed by characters matching `query` under `policy`.
    #[must_use]
    pub fn search(&self, query: &str, policy: &SearchPolicy) -> Vec<Entity<'_>> {
        self.search_items(query, policy)
            .into_iter()
            .map(Entity::Item)
            .chain(
                self.search_characters(query, policy)
                    .into_iter()
                    .map(Entity::Character),
            )
            .collect()
    }

    /// Drop memoized search results.
    pub fn invalidate(&self) {
        // The prefix is a literal so the pattern always compiles
        if let Ok(removed) = self.cache.clear_matching(&format!("^{SEARCH_CACHE_PREFIX}")) {
            debug!(removed, "invalidated search cache");
        }
    }

    /// Memoized ids of matching records.
    ///
    /// Keys carry the catalog identity so services over different catalogs
    /// can share one cache.
    fn matching<F>(&self, scope: Scope, query: &str, compute: F) -> Arc<Vec<String>>
    where
        F: FnOnce() -> Vec<String>,
    {
        let key = format!(
            "{SEARCH_CACHE_PREFIX}{}:{}:{}",
            self.catalog.identity(),
            scope.as_str(),
            normalize(query)
        );
        self.cache.get_or_insert_with(&key, compute)
    }
}

fn normalize(query: &str) -> String {
    query.trim().to_lowercase()
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn matching_ids<T>(
    records: &[T],
    id: impl Fn(&T) -> &str,
    predicate: impl Fn(&T) -> bool,
) -> Vec<String> {
    records
        .iter()
        .filter(|record| predicate(record))
        .map(|record| id(record).to_string())
        .collect()
}
