//! Explicitly owned memoization cache.
//!
//! A `DataCache` is created by whoever needs it and handed to consumers by
//! clone; there is no process-wide instance. Values of any `Send + Sync`
//! type can be stored under string keys.

use crate::error::Result;
use regex::Regex;
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

type Entry = Arc<dyn Any + Send + Sync>;

/// String-keyed cache of computed values.
#[derive(Clone, Default)]
pub struct DataCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl DataCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cached value, if present with the requested type.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        let entries = self.entries.read().expect("data cache lock poisoned");
        entries
            .get(key)
            .and_then(|entry| Arc::clone(entry).downcast::<T>().ok())
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    ///
    /// `compute` runs without holding the lock. If another caller stored a
    /// value of the same type meanwhile, that value is returned instead.
    pub fn get_or_insert_with<T, F>(&self, key: &str, compute: F) -> Arc<T>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        if let Some(value) = self.get::<T>(key) {
            return value;
        }

        let computed = Arc::new(compute());

        let mut entries = self.entries.write().expect("data cache lock poisoned");
        if let Some(existing) = entries
            .get(key)
            .and_then(|entry| Arc::clone(entry).downcast::<T>().ok())
        {
            return existing;
        }

        debug!(key, "caching computed value");
        entries.insert(key.to_string(), Arc::clone(&computed) as Entry);
        computed
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().expect("data cache lock poisoned").len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries
            .write()
            .expect("data cache lock poisoned")
            .clear();
    }

    /// Drop entries whose key matches `pattern`, returning how many were removed.
    ///
    /// # Errors
    /// Returns error if `pattern` is not a valid regular expression.
    pub fn clear_matching(&self, pattern: &str) -> Result<usize> {
        let regex = Regex::new(pattern)?;
        let mut entries = self.entries.write().expect("data cache lock poisoned");

        let before = entries.len();
        entries.retain(|key, _| !regex.is_match(key));
        let removed = before - entries.len();

        debug!(pattern, removed, "cleared cache entries");
        Ok(removed)
    }
}

impl std::fmt::Debug for DataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataCache")
            .field("entries", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use std::cell::Cell;

    #[test]
    fn test_get_or_insert_computes_once() {
        let cache = DataCache::new();
        let calls = Cell::new(0);

        let first = cache.get_or_insert_with("answer", || {
            calls.set(calls.get() + 1);
            42_u32
        });
        let second = cache.get_or_insert_with("answer", || {
            calls.set(calls.get() + 1);
            0_u32
        });

        assert_eq!(*first, 42);
        assert_eq!(*second, 42);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_type_mismatch_recomputes() {
        let cache = DataCache::new();
        cache.get_or_insert_with("key", || 1_u32);

        assert!(cache.get::<String>("key").is_none());
        let replaced = cache.get_or_insert_with("key", || "text".to_string());
        assert_eq!(replaced.as_str(), "text");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear_matching() {
        let cache = DataCache::new();
        cache.get_or_insert_with("search:items:cake", || vec![1_usize]);
        cache.get_or_insert_with("search:characters:mame", || vec![2_usize]);
        cache.get_or_insert_with("stats", || 3_usize);

        let removed = cache.clear_matching("^search:").expect("valid pattern");
        assert_eq!(removed, 2);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_matching_invalid_pattern() {
        let cache = DataCache::new();
        assert!(matches!(
            cache.clear_matching("("),
            Err(CatalogError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_clones_share_entries() {
        let cache = DataCache::new();
        let clone = cache.clone();
        cache.get_or_insert_with("shared", || 7_i64);
        assert_eq!(clone.get::<i64>("shared").as_deref(), Some(&7));
    }
}
