//! Error types for the application shell.

use tamadex_catalog::CatalogError;
use tamadex_core::ConfigError;
use tamadex_db::DatabaseError;
use tamadex_favorites::FavoritesError;
use thiserror::Error;

/// Errors surfaced by application commands.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded or resolved
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The dataset could not be loaded
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The favorites database could not be opened
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// The favorites stores failed
    #[error(transparent)]
    Favorites(#[from] FavoritesError),

    /// A command named an entity that does not exist
    #[error("{kind} '{id}' not found")]
    NotFound {
        /// Entity kind
        kind: &'static str,
        /// Requested id
        id: String,
    },

    /// Output could not be serialized
    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl AppError {
    pub(crate) fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, AppError>;
