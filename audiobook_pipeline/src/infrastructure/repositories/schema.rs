// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SQLite schema helpers shared by the metadata store and queue broker,
//! which live on the same database (spec §6.5).

use sqlx::migrate::MigrateDatabase;
use sqlx::SqlitePool;
use tracing::{debug, info};

/// Runs pending migrations against the provided pool. Idempotent: sqlx
/// tracks which migrations already ran in a `_sqlx_migrations` table.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    debug!("ensuring database schema is up to date");
    sqlx::migrate!("../migrations").run(pool).await?;
    info!("database schema is up to date");
    Ok(())
}

/// Creates the SQLite database file if it doesn't already exist.
/// `SqlitePool::connect` fails against a missing file unless the
/// connection options set `create_if_missing`, so callers that want plain
/// connection strings create the file first.
pub async fn create_database_if_missing(database_url: &str) -> Result<(), sqlx::Error> {
    if !sqlx::Sqlite::database_exists(database_url).await? {
        debug!(database_url, "database does not exist, creating");
        sqlx::Sqlite::create_database(database_url).await?;
        info!(database_url, "created new SQLite database");
    }
    Ok(())
}

/// Creates (if needed), connects, and migrates in one call. The standard
/// entry point for both `serve` and `worker` subcommands.
pub async fn initialize_database(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    create_database_if_missing(database_url).await?;
    let pool = SqlitePool::connect(database_url).await?;
    ensure_schema(&pool).await?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn creates_a_missing_database_file() {
        let temp = NamedTempFile::new().unwrap();
        let db_path = temp.path().to_str().unwrap().to_string();
        drop(temp);
        let db_url = format!("sqlite://{}", db_path);

        create_database_if_missing(&db_url).await.unwrap();
        // Idempotent: calling again on an existing database is a no-op.
        create_database_if_missing(&db_url).await.unwrap();
    }

    #[tokio::test]
    async fn initializes_and_migrates_a_fresh_database() {
        let temp = NamedTempFile::new().unwrap();
        let db_path = temp.path().to_str().unwrap().to_string();
        drop(temp);
        let db_url = format!("sqlite://{}", db_path);

        let pool = initialize_database(&db_url).await.unwrap();

        let count: i32 = sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='books'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1, "books table should exist after migration");
    }

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let temp = NamedTempFile::new().unwrap();
        let db_path = temp.path().to_str().unwrap().to_string();
        drop(temp);
        let db_url = format!("sqlite://{}", db_path);

        create_database_if_missing(&db_url).await.unwrap();
        let pool = SqlitePool::connect(&db_url).await.unwrap();

        ensure_schema(&pool).await.unwrap();
        ensure_schema(&pool).await.unwrap();
    }
}
