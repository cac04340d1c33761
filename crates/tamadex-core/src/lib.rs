//! Tamadex Core - Foundation crate for the Tamadex catalog.
//!
//! This crate provides shared types, error handling and configuration
//! management that all other Tamadex crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Validation and configuration errors using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Shared newtypes and enums (`EntityId`, `CategoryId`, `Rarity`, `SearchPolicy`)
//!
//! # Example
//!
//! ```rust
//! use tamadex_core::{AppConfig, SearchPolicy};
//!
//! let config = AppConfig::default();
//! assert_eq!(config.search.items, SearchPolicy::strict(2));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, DataConfig, SearchConfig, StorageConfig};
pub use error::{ConfigError, ConfigResult, TamadexError};
pub use types::{BelowMinimum, CategoryId, EntityId, Rarity, SearchPolicy};
