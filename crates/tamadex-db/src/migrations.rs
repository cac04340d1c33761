//! Schema for the key-value store.
//!
//! The only table is `kv_store`, created by the SQL files under
//! `migrations/`. They are compiled into the crate with `sqlx::migrate!` and
//! applied every time a [`crate::Database`] is opened.

use crate::error::{DatabaseError, Result};
use sqlx::{Pool, Sqlite};

/// Bring the `kv_store` schema up to date.
///
/// `SQLx` records applied migrations in `_sqlx_migrations`, so only new
/// files run on an existing database.
///
/// # Errors
/// Returns `DatabaseError::Migration` if any migration fails to execute.
pub async fn run_migrations(pool: &Pool<Sqlite>) -> Result<()> {
    let migrator = sqlx::migrate!("./migrations");
    tracing::debug!(available = migrator.iter().count(), "applying kv_store migrations");

    migrator
        .run(pool)
        .await
        .map_err(|e| DatabaseError::Migration(format!("kv_store migration failed: {e}")))?;

    tracing::info!("kv_store schema up to date");
    Ok(())
}

/// Highest successfully applied migration version, 0 on a fresh database.
///
/// # Errors
/// Returns `DatabaseError` if the migrations table cannot be queried.
pub async fn get_schema_version(pool: &Pool<Sqlite>) -> Result<i64> {
    let tracked: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations')",
    )
    .fetch_one(pool)
    .await?;

    if !tracked {
        return Ok(0);
    }

    let version: Option<i64> =
        sqlx::query_scalar("SELECT MAX(version) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?;

    Ok(version.unwrap_or(0))
}
