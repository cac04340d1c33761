//! Tamadex Catalog - Dataset loading, lookup and search.
//!
//! This crate turns the exported dataset document into immutable, normalized
//! collections of items, characters and categories, and answers read-only
//! queries over them.
//!
//! # Architecture
//!
//! - **Model** ([`model`]): Normalized `Item`, `Character` and `Category` records
//! - **Loader** ([`loader`]): JSON loading, legacy field aliases, fallback ids
//! - **Images** ([`images`]): Character image resolution chain and embedded tiers
//! - **Catalog** ([`catalog`]): By-id, by-category and join lookups
//! - **Search** ([`search`]): Substring search under a caller-chosen policy
//! - **Cache** ([`cache`]): Owned memoization cache for computed results
//! - **Errors** ([`error`]): Catalog-specific error types
//!
//! # Example
//!
//! ```rust
//! use tamadex_catalog::{Catalog, DataCache, Dataset, SearchService};
//! use tamadex_core::SearchPolicy;
//!
//! let catalog = Catalog::new(Dataset::default());
//! let search = SearchService::new(catalog, DataCache::new());
//!
//! assert!(search.search_items("", &SearchPolicy::browse()).is_empty());
//! assert!(search.search("cake", &SearchPolicy::strict(2)).is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod cache;
pub mod catalog;
pub mod error;
pub mod images;
pub mod loader;
pub mod model;
mod raw;
pub mod search;

// Re-export commonly used types
pub use cache::DataCache;
pub use catalog::Catalog;
pub use error::{CatalogError, Result};
pub use images::{
    EmbeddedImages, ImageMap, ImageMapSource, ImageOrigin, ImageResolver, ResolvedImage,
    TierState,
};
pub use loader::DatasetLoader;
pub use model::{Category, Character, Dataset, Entity, Item};
pub use search::SearchService;
