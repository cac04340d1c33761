//! Error types for the catalog subsystem.

use thiserror::Error;

/// Errors that can occur while loading or querying the catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A data source file does not exist
    #[error("data source not found at {path}")]
    SourceNotFound {
        /// Expected file path
        path: String,
    },

    /// Failed to read a data source file
    #[error("failed to read data source {path}: {source}")]
    LoadError {
        /// Path to the source file
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a data source as JSON
    #[error("failed to parse JSON in {path}: {source}")]
    ParseError {
        /// Path (or label) of the source
        path: String,
        /// JSON parse error
        #[source]
        source: serde_json::Error,
    },

    /// The dataset parsed but does not have the expected structure
    #[error("malformed dataset: {reason}")]
    MalformedSource {
        /// What was wrong with the document
        reason: String,
    },

    /// Invalid cache key pattern
    #[error("invalid cache key pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
