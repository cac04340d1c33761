//! Favorites error types.

use thiserror::Error;

/// Errors raised by the favorites store.
///
/// Storage failures never reach toggle callers; the background writer
/// logs them and carries on.
#[derive(Debug, Error)]
pub enum FavoritesError {
    /// The durable store failed.
    #[error("storage error: {0}")]
    Storage(#[from] tamadex_db::DatabaseError),

    /// The stored value is not a JSON array of strings.
    #[error("corrupt favorites under '{key}': {source}")]
    Corrupt {
        /// Storage key that held the value
        key: &'static str,
        /// Parse error
        #[source]
        source: serde_json::Error,
    },

    /// A snapshot could not be encoded.
    #[error("failed to encode favorites: {0}")]
    Encode(#[source] serde_json::Error),

    /// The store was opened outside a Tokio runtime.
    #[error("favorites store requires a Tokio runtime")]
    NoRuntime,

    /// The background writer is gone.
    #[error("favorites writer stopped")]
    WriterStopped,
}

/// Result type for favorites operations.
pub type Result<T> = std::result::Result<T, FavoritesError>;
