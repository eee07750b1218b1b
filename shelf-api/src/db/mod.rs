//! Database access for shelf-api
//!
//! SQLite via sqlx. Tables are created on startup if missing.

pub mod books;

pub use books::Book;

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
///
/// Creates the parent directory and the database file when missing.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    // mode=rwc: read, write, create
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url)
        .await
        .context("Failed to connect to database")?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// In-memory pool for tests and throwaway runs
///
/// Pinned to a single connection that never expires: every SQLite
/// in-memory connection is its own database.
pub async fn init_memory_pool() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .context("Failed to create in-memory database")?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create the books table and its indexes if they don't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS books (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL CHECK (title <> ''),
            author TEXT NOT NULL CHECK (author <> ''),
            published_year INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            deleted_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_books_deleted_at ON books(deleted_at)")
        .execute(pool)
        .await?;

    tracing::info!("Database tables initialized (books)");

    Ok(())
}
