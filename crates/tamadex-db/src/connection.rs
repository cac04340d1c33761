//! Database connection management.
//!
//! Wraps an `SQLx` `SQLite` pool. On-disk databases are created on first
//! open, including missing parent directories.

use crate::error::{DatabaseError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;

/// Path that opens a private in-memory database.
pub const MEMORY_PATH: &str = ":memory:";

const MAX_FILE_CONNECTIONS: u32 = 5;

/// `SQLite` connection pool.
#[derive(Debug, Clone)]
pub struct ConnectionPool {
    pool: Pool<Sqlite>,
}

impl ConnectionPool {
    /// Open a connection pool.
    ///
    /// # Arguments
    /// * `path` - Path to the `SQLite` database file (or `:memory:` for in-memory)
    ///
    /// # Errors
    /// Returns `DatabaseError` if:
    /// - The path is not valid UTF-8
    /// - The parent directory cannot be created
    /// - The database file cannot be opened
    /// - The opened database does not answer queries
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.to_str().ok_or_else(|| {
            DatabaseError::Open("invalid database path: not valid UTF-8".to_string())
        })?;

        let in_memory = path_str == MEMORY_PATH;
        if !in_memory {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let connect_options = SqliteConnectOptions::from_str(path_str)
            .map_err(|e| DatabaseError::Open(format!("invalid connection string: {e}")))?
            .create_if_missing(true);

        // Every in-memory connection is its own database
        let max_connections = if in_memory { 1 } else { MAX_FILE_CONNECTIONS };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await
            .map_err(|e| DatabaseError::Open(format!("failed to initialize pool: {e}")))?;

        let pool = Self { pool };
        pool.ping().await?;

        tracing::info!(path = path_str, max_connections, "database pool created");
        Ok(pool)
    }

    /// Get a reference to the underlying `SQLx` pool.
    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Close the connection pool gracefully.
    pub async fn close(self) {
        self.pool.close().await;
        tracing::info!("database pool closed");
    }

    /// Check that the database answers queries.
    ///
    /// # Errors
    /// Returns `DatabaseError::Unavailable` if a trivial query fails.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::Unavailable(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_memory_pool_creation() {
        let pool = ConnectionPool::new(MEMORY_PATH)
            .await
            .expect("create memory pool");

        pool.ping().await.expect("ping database");
    }

    #[tokio::test]
    async fn test_file_pool_creates_parent_dirs() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("nested").join("dir").join("favorites.db");

        let pool = ConnectionPool::new(&path).await.expect("create file pool");
        pool.ping().await.expect("ping database");

        assert!(path.exists());
        pool.close().await;
    }

    #[tokio::test]
    async fn test_memory_pool_keeps_state_across_queries() {
        let pool = ConnectionPool::new(MEMORY_PATH)
            .await
            .expect("create memory pool");

        sqlx::query("CREATE TABLE t (x INTEGER)")
            .execute(pool.pool())
            .await
            .expect("create table");
        sqlx::query("INSERT INTO t (x) VALUES (1)")
            .execute(pool.pool())
            .await
            .expect("insert row");

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM t")
            .fetch_one(pool.pool())
            .await
            .expect("count rows");
        assert_eq!(count, 1);
    }
}
