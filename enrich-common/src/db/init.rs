//! Database initialization
//!
//! Creates the database file on first run and the `people` table if it
//! does not exist. Safe to call on every startup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_people_table(&pool).await?;

    Ok(pool)
}

/// Open an in-memory database with the full schema
///
/// Uses a single connection: every connection to `sqlite::memory:` is a
/// separate database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    create_people_table(&pool).await?;

    Ok(pool)
}

/// Create the `people` table (idempotent)
///
/// The `*_folded` columns hold lowercased copies of the text columns for
/// case-insensitive substring search; writers keep them in step.
pub async fn create_people_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS people (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            surname TEXT NOT NULL,
            patronymic TEXT NOT NULL DEFAULT '',
            age INTEGER NOT NULL DEFAULT 0 CHECK (age >= 0),
            gender TEXT NOT NULL DEFAULT '',
            nationality TEXT NOT NULL DEFAULT '',
            name_folded TEXT NOT NULL DEFAULT '',
            surname_folded TEXT NOT NULL DEFAULT '',
            patronymic_folded TEXT NOT NULL DEFAULT '',
            gender_folded TEXT NOT NULL DEFAULT '',
            nationality_folded TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
