//! Tamadex Favorites - Persisted sets of favorited ids.
//!
//! Two independent stores exist per app, one per [`FavoritesDomain`]. Each
//! keeps its set in memory for synchronous reads and toggles, notifies
//! subscribers on every change, and persists the latest state through a
//! background writer over a [`tamadex_db::KeyValueStore`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tamadex_db::MemoryStore;
//! use tamadex_favorites::{FavoritesDomain, FavoritesStore};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FavoritesStore::open(FavoritesDomain::Items, Arc::new(MemoryStore::new()))?;
//! store.wait_until_hydrated().await?;
//!
//! assert!(store.toggle("tama-item-0"));
//! assert!(store.is_favorite("tama-item-0"));
//! store.flush().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod domain;
pub mod error;
pub mod event;
pub mod store;
mod writer;

// Re-export commonly used types
pub use domain::FavoritesDomain;
pub use error::{FavoritesError, Result};
pub use event::{FavoritesEvent, Subscription};
pub use store::FavoritesStore;
