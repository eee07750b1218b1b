//! Book database operations
//!
//! Deletes are soft: `destroy` stamps `deleted_at` and every lookup skips
//! stamped rows.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use shelf_common::ValidatedBook;
use sqlx::sqlite::{Sqlite, SqliteRow};
use sqlx::{Executor, Row, SqlitePool};
use uuid::Uuid;

/// Persisted book record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub published_year: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Book {
    fn from_row(row: &SqliteRow) -> Result<Self> {
        let id: String = row.try_get("id")?;

        Ok(Self {
            id: Uuid::parse_str(&id)?,
            title: row.try_get("title")?,
            author: row.try_get("author")?,
            published_year: row.try_get("published_year")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            deleted_at: row.try_get("deleted_at")?,
        })
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, title, author, published_year, created_at, updated_at, deleted_at FROM books";

/// Load every live book, oldest first
pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Book>> {
    let rows = sqlx::query(&format!(
        "{} WHERE deleted_at IS NULL ORDER BY created_at, rowid",
        SELECT_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    rows.iter().map(Book::from_row).collect()
}

/// Load a live book by primary key
///
/// Identifiers that are not UUIDs simply match nothing.
pub async fn find_by_pk(pool: &SqlitePool, id: &str) -> Result<Option<Book>> {
    let row = sqlx::query(&format!(
        "{} WHERE id = ? AND deleted_at IS NULL",
        SELECT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(Book::from_row).transpose()
}

/// Insert one book
pub async fn create(pool: &SqlitePool, fields: &ValidatedBook) -> Result<Book> {
    insert(pool, fields, Utc::now()).await
}

/// Overwrite title, author and year of an existing book
pub async fn update(pool: &SqlitePool, book: &Book, fields: &ValidatedBook) -> Result<Book> {
    let updated_at = Utc::now();

    sqlx::query(
        r#"
        UPDATE books
        SET title = ?, author = ?, published_year = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&fields.title)
    .bind(&fields.author)
    .bind(fields.published_year)
    .bind(updated_at)
    .bind(book.id.to_string())
    .execute(pool)
    .await?;

    Ok(Book {
        title: fields.title.clone(),
        author: fields.author.clone(),
        published_year: fields.published_year,
        updated_at,
        ..book.clone()
    })
}

/// Soft-delete a book
pub async fn destroy(pool: &SqlitePool, book: &Book) -> Result<()> {
    sqlx::query("UPDATE books SET deleted_at = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(book.id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

/// Insert many books in one transaction
///
/// All-or-nothing: any failing insert rolls back the whole batch.
pub async fn bulk_create(pool: &SqlitePool, rows: &[ValidatedBook]) -> Result<Vec<Book>> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;
    let mut books = Vec::with_capacity(rows.len());

    for fields in rows {
        books.push(insert(&mut *tx, fields, now).await?);
    }

    tx.commit().await?;
    tracing::debug!("Bulk inserted {} books", books.len());

    Ok(books)
}

async fn insert<'e, E>(executor: E, fields: &ValidatedBook, now: DateTime<Utc>) -> Result<Book>
where
    E: Executor<'e, Database = Sqlite>,
{
    let book = Book {
        id: Uuid::new_v4(),
        title: fields.title.clone(),
        author: fields.author.clone(),
        published_year: fields.published_year,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    };

    sqlx::query(
        r#"
        INSERT INTO books (id, title, author, published_year, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(book.id.to_string())
    .bind(&book.title)
    .bind(&book.author)
    .bind(book.published_year)
    .bind(book.created_at)
    .bind(book.updated_at)
    .execute(executor)
    .await?;

    Ok(book)
}
