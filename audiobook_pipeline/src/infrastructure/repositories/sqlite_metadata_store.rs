// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SQLite adapter for the `MetadataStore` contract (spec §4.1). Maps
//! `books`/`chunks` rows to domain entities and implements the
//! expected-state guard for `update_book_state` as a single `UPDATE ...
//! WHERE id = ? AND state = ?` statement, checked against `rows_affected`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use audiobook_pipeline_domain::{
    Book, BookFormat, BookId, BookState, Chunk, DomainError, MetadataStore, Paging, Percent, UpdateOutcome, UserId,
};

pub struct SqliteMetadataStore {
    pool: SqlitePool,
}

impl SqliteMetadataStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn map_sqlx_err(err: sqlx::Error) -> DomainError {
    DomainError::Transient(format!("metadata store: {err}"))
}

fn parse_book_format(raw: &str) -> Result<BookFormat, DomainError> {
    BookFormat::parse(raw).ok_or_else(|| DomainError::Integrity(format!("unknown book format in row: {raw}")))
}

fn parse_book_state(raw: &str) -> Result<BookState, DomainError> {
    BookState::parse(raw).ok_or_else(|| DomainError::Integrity(format!("unknown book state in row: {raw}")))
}

fn row_to_book(row: &sqlx::sqlite::SqliteRow) -> Result<Book, DomainError> {
    let id: String = row.try_get("id").map_err(map_sqlx_err)?;
    let owner_id: String = row.try_get("owner_id").map_err(map_sqlx_err)?;
    let percent_complete: i64 = row.try_get("percent_complete").map_err(map_sqlx_err)?;
    let total_chunks: Option<i64> = row.try_get("total_chunks").map_err(map_sqlx_err)?;

    Ok(Book {
        id: BookId::from_string(&id)?,
        owner_id: UserId::from_string(&owner_id)?,
        title: row.try_get("title").map_err(map_sqlx_err)?,
        format: parse_book_format(&row.try_get::<String, _>("format").map_err(map_sqlx_err)?)?,
        state: parse_book_state(&row.try_get::<String, _>("state").map_err(map_sqlx_err)?)?,
        percent_complete: Percent::new(percent_complete as u8)?,
        total_chunks: total_chunks.map(|n| n as u32),
        error_message: row.try_get("error_message").map_err(map_sqlx_err)?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(map_sqlx_err)?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at").map_err(map_sqlx_err)?,
    })
}

fn row_to_chunk(row: &sqlx::sqlite::SqliteRow) -> Result<Chunk, DomainError> {
    let book_id: String = row.try_get("book_id").map_err(map_sqlx_err)?;
    let seq: i64 = row.try_get("seq").map_err(map_sqlx_err)?;
    let byte_size: i64 = row.try_get("byte_size").map_err(map_sqlx_err)?;

    Ok(Chunk {
        book_id: BookId::from_string(&book_id)?,
        seq: seq as u32,
        duration_s: row.try_get("duration_s").map_err(map_sqlx_err)?,
        byte_size: byte_size as u64,
        blob_path: row.try_get("blob_path").map_err(map_sqlx_err)?,
    })
}

#[async_trait]
impl MetadataStore for SqliteMetadataStore {
    async fn create_book(&self, book: &Book) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO books (id, owner_id, title, format, state, percent_complete, total_chunks, error_message, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(book.id.to_string())
        .bind(book.owner_id.to_string())
        .bind(&book.title)
        .bind(book.format.extension())
        .bind(book.state.as_str())
        .bind(book.percent_complete.get() as i64)
        .bind(book.total_chunks.map(|n| n as i64))
        .bind(&book.error_message)
        .bind(book.created_at)
        .bind(book.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn get_book(&self, book_id: &BookId) -> Result<Book, DomainError> {
        let row = sqlx::query("SELECT * FROM books WHERE id = ?")
            .bind(book_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?
            .ok_or_else(|| DomainError::NotFound(format!("book {book_id} not found")))?;
        row_to_book(&row)
    }

    async fn list_books_for_owner(&self, owner: &UserId, paging: Paging) -> Result<Vec<Book>, DomainError> {
        let limit = if paging.limit == 0 { 50 } else { paging.limit };
        let rows = sqlx::query("SELECT * FROM books WHERE owner_id = ? ORDER BY created_at DESC LIMIT ? OFFSET ?")
            .bind(owner.to_string())
            .bind(limit as i64)
            .bind(paging.offset as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        rows.iter().map(row_to_book).collect()
    }

    async fn update_book_state(
        &self,
        book_id: &BookId,
        expected_state: BookState,
        new_state: BookState,
        percent: Option<Percent>,
        error: Option<String>,
    ) -> Result<UpdateOutcome, DomainError> {
        // The `WHERE state = ?` guard is the entire optimistic-concurrency
        // mechanism (spec §4.1, §4.5): a second worker racing on the same
        // book observes `rows_affected() == 0` and backs off instead of
        // double-advancing it.
        let result = if let Some(percent) = percent {
            sqlx::query(
                "UPDATE books SET state = ?, percent_complete = ?, error_message = ?, updated_at = ? \
                 WHERE id = ? AND state = ?",
            )
            .bind(new_state.as_str())
            .bind(percent.get() as i64)
            .bind(&error)
            .bind(Utc::now())
            .bind(book_id.to_string())
            .bind(expected_state.as_str())
            .execute(&self.pool)
            .await
        } else {
            sqlx::query("UPDATE books SET state = ?, error_message = ?, updated_at = ? WHERE id = ? AND state = ?")
                .bind(new_state.as_str())
                .bind(&error)
                .bind(Utc::now())
                .bind(book_id.to_string())
                .bind(expected_state.as_str())
                .execute(&self.pool)
                .await
        }
        .map_err(map_sqlx_err)?;

        if result.rows_affected() == 0 {
            // Distinguish "book doesn't exist at all" from "someone else
            // already moved it" so callers don't retry a permanently
            // missing book forever.
            self.get_book(book_id).await?;
            return Ok(UpdateOutcome::StaleTransition);
        }
        Ok(UpdateOutcome::Applied)
    }

    async fn set_total_chunks(&self, book_id: &BookId, n: u32) -> Result<(), DomainError> {
        let row = sqlx::query("SELECT total_chunks FROM books WHERE id = ?")
            .bind(book_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_err)?
            .ok_or_else(|| DomainError::NotFound(format!("book {book_id} not found")))?;
        let existing: Option<i64> = row.try_get("total_chunks").map_err(map_sqlx_err)?;
        if let Some(existing) = existing {
            if existing as u32 != n {
                return Err(DomainError::Integrity(format!(
                    "total_chunks already set to {existing}, refusing to change to {n}"
                )));
            }
            return Ok(());
        }
        sqlx::query("UPDATE books SET total_chunks = ?, updated_at = ? WHERE id = ?")
            .bind(n as i64)
            .bind(Utc::now())
            .bind(book_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn upsert_chunk(&self, chunk: &Chunk) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO chunks (book_id, seq, duration_s, byte_size, blob_path) VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT (book_id, seq) DO UPDATE SET duration_s = excluded.duration_s, \
             byte_size = excluded.byte_size, blob_path = excluded.blob_path",
        )
        .bind(chunk.book_id.to_string())
        .bind(chunk.seq as i64)
        .bind(chunk.duration_s)
        .bind(chunk.byte_size as i64)
        .bind(&chunk.blob_path)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn list_chunks(&self, book_id: &BookId) -> Result<Vec<Chunk>, DomainError> {
        let rows = sqlx::query("SELECT * FROM chunks WHERE book_id = ? ORDER BY seq ASC")
            .bind(book_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        rows.iter().map(row_to_chunk).collect()
    }

    async fn delete_book(&self, book_id: &BookId) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_err)?;
        sqlx::query("DELETE FROM chunks WHERE book_id = ?")
            .bind(book_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
        sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(book_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
        tx.commit().await.map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn list_pending_books(&self) -> Result<Vec<Book>, DomainError> {
        let rows = sqlx::query("SELECT * FROM books WHERE state = ? ORDER BY created_at ASC")
            .bind(BookState::Pending.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_err)?;
        rows.iter().map(row_to_book).collect()
    }
}
