//! Tamadex Database Layer
//!
//! Durable key-value storage for user preferences such as favorites lists.
//! Uses `SQLx` with `SQLite` and embedded migrations.
//!
//! # Architecture
//!
//! - **Connection** ([`connection`]): Pool creation for files and `:memory:`
//! - **Migrations** ([`migrations`]): Embedded, versioned schema
//! - **Rows** ([`kv`]): Upsert/get/delete over the `kv_store` table
//! - **Stores** ([`store`]): The [`KeyValueStore`] trait with `SQLite` and in-memory backends
//!
//! # Example
//!
//! ```ignore
//! use tamadex_db::{Database, KeyValueStore, SqliteStore};
//!
//! let db = Database::open("favorites.db").await?;
//! let store = SqliteStore::new(db);
//! store.set("tama_favorites", r#"["mametchi"]"#).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod connection;
pub mod error;
pub mod kv;
pub mod migrations;
pub mod store;

// Re-export commonly used types
pub use connection::{ConnectionPool, MEMORY_PATH};
pub use error::{DatabaseError, Result};
pub use store::{KeyValueStore, MemoryStore, SqliteStore};

use std::path::Path;

/// Migrated database handle.
///
/// Cloning shares the underlying pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: ConnectionPool,
}

impl Database {
    /// Open (creating if needed) the database at `path` and apply migrations.
    ///
    /// # Errors
    /// Returns `DatabaseError` if the database cannot be opened or migrated.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Self::from_pool(ConnectionPool::new(path).await?);
        db.run_migrations().await?;
        Ok(db)
    }

    /// Open a migrated private in-memory database.
    ///
    /// # Errors
    /// Returns `DatabaseError` if the database cannot be created or migrated.
    pub async fn open_in_memory() -> Result<Self> {
        Self::open(MEMORY_PATH).await
    }

    /// Wrap an existing pool without running migrations.
    #[must_use]
    pub fn from_pool(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Run all pending database migrations.
    ///
    /// # Errors
    /// Returns `DatabaseError::Migration` if any migration fails.
    pub async fn run_migrations(&self) -> Result<()> {
        migrations::run_migrations(self.pool.pool()).await
    }

    /// Get the current schema version.
    ///
    /// # Errors
    /// Returns `DatabaseError` if the version cannot be queried.
    pub async fn get_schema_version(&self) -> Result<i64> {
        migrations::get_schema_version(self.pool.pool()).await
    }

    /// Get a reference to the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Sqlite> {
        self.pool.pool()
    }

    /// Close the database connection gracefully.
    pub async fn close(self) {
        self.pool.close().await;
    }
}
