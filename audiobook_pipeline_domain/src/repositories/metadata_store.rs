// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Metadata Store contract (spec §4.1): the single source of truth for book
//! and chunk rows, and the home of the expected-state guard that makes
//! `UpdateBookState` the linchpin of the whole coordination scheme.

use async_trait::async_trait;

use crate::entities::{Book, Chunk};
use crate::error::DomainError;
use crate::value_objects::{BookId, BookState, Percent, UserId};

/// Pagination cursor for `list_books_for_owner`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Paging {
    pub limit: u32,
    pub offset: u32,
}

/// Result of `update_book_state`'s optimistic-concurrency check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied,
    StaleTransition,
}

#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Atomic insert of a new book row. The book must already be constructed
    /// (and validated) by the caller; this only persists it.
    async fn create_book(&self, book: &Book) -> Result<(), DomainError>;

    async fn get_book(&self, book_id: &BookId) -> Result<Book, DomainError>;

    /// Sorted by `created_at desc`.
    async fn list_books_for_owner(&self, owner: &UserId, paging: Paging) -> Result<Vec<Book>, DomainError>;

    /// Applies only if the book's current state equals `expected_state`;
    /// otherwise returns `UpdateOutcome::StaleTransition` without mutating
    /// anything. `percent` and `error` are optional companion updates to
    /// `percent_complete` / `error_message`.
    async fn update_book_state(
        &self,
        book_id: &BookId,
        expected_state: BookState,
        new_state: BookState,
        percent: Option<Percent>,
        error: Option<String>,
    ) -> Result<UpdateOutcome, DomainError>;

    /// Idempotent if `n` matches the existing value; fails if a different
    /// non-null value is already set.
    async fn set_total_chunks(&self, book_id: &BookId, n: u32) -> Result<(), DomainError>;

    /// Idempotent on `(book_id, seq)`.
    async fn upsert_chunk(&self, chunk: &Chunk) -> Result<(), DomainError>;

    /// Ordered by `seq` ascending.
    async fn list_chunks(&self, book_id: &BookId) -> Result<Vec<Chunk>, DomainError>;

    /// Removes the book row and all its chunk rows in one transaction.
    /// Idempotent: deleting an already-absent book is not an error.
    async fn delete_book(&self, book_id: &BookId) -> Result<(), DomainError>;

    /// Books currently in `Pending` with no matching extract-queue entry —
    /// used by the Ingest Gateway's boot-time reconciliation sweep
    /// (SPEC_FULL §4.6) to recover from a crash between the row insert and
    /// the enqueue.
    async fn list_pending_books(&self) -> Result<Vec<Book>, DomainError>;
}
