// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Ingest Gateway (spec §4.6): validates and stores an upload, creates the
//! book row, and starts the pipeline.

use std::sync::Arc;
use tracing::{info, warn};

use audiobook_pipeline_domain::{Book, BookFormat, BookId, BlobStore, DomainError, Job, MetadataStore, QueueBroker, Stage, UserId};

use crate::error::{CoreError, CoreResult};

pub struct IngestGateway {
    blob_store: Arc<dyn BlobStore>,
    metadata_store: Arc<dyn MetadataStore>,
    queue_broker: Arc<dyn QueueBroker>,
    max_upload_bytes: u64,
}

impl IngestGateway {
    pub fn new(blob_store: Arc<dyn BlobStore>, metadata_store: Arc<dyn MetadataStore>, queue_broker: Arc<dyn QueueBroker>, max_upload_bytes: u64) -> Self {
        Self {
            blob_store,
            metadata_store,
            queue_broker,
            max_upload_bytes,
        }
    }

    /// `SubmitBook` (spec §4.6): validates title/format/size/extension,
    /// writes the upload, inserts the `Pending` row, and enqueues the
    /// `extract` job. A failure to enqueue after the row is committed is
    /// not surfaced as an error to the caller — `reconcile_pending_books`
    /// recovers it on the next boot.
    pub async fn submit_book(&self, owner: UserId, title: String, declared_format: BookFormat, filename: &str, bytes: Vec<u8>) -> CoreResult<BookId> {
        if bytes.len() as u64 > self.max_upload_bytes {
            return Err(CoreError::PayloadTooLarge(format!(
                "upload is {} bytes, exceeds the {} byte limit",
                bytes.len(),
                self.max_upload_bytes
            )));
        }

        let sniffed = BookFormat::sniff_from_filename(filename);
        if sniffed != Some(declared_format) {
            return Err(DomainError::Validation(format!(
                "declared format {declared_format} does not match uploaded file name {filename}"
            ))
            .into());
        }

        let book = Book::new(owner, title, declared_format)?;
        let source_path = format!("{}/source.{}", book.id, declared_format.extension());
        self.blob_store.put(&source_path, bytes).await?;
        self.metadata_store.create_book(&book).await?;

        if let Err(e) = self.queue_broker.enqueue(Stage::Extract.queue_name(), Job::new(book.id.clone())).await {
            warn!(book_id = %book.id, error = %e, "failed to enqueue extract job after book creation, relying on reconciliation sweep");
        }

        info!(book_id = %book.id, "book submitted");
        Ok(book.id)
    }

    /// `DeleteBook` (spec §4.6): ownership check, transactional row
    /// delete, then best-effort blob prefix cleanup. A blob-delete failure
    /// does not roll back the row delete (spec §4.6 names this an orphan
    /// GC gap, explicitly out of scope for this spec's guarantees).
    pub async fn delete_book(&self, owner: &UserId, book_id: &BookId) -> CoreResult<()> {
        let book = self.metadata_store.get_book(book_id).await?;
        if !book.is_owned_by(owner) {
            return Err(DomainError::Auth("book not owned by caller".into()).into());
        }

        self.metadata_store.delete_book(book_id).await?;
        if let Err(e) = self.blob_store.delete(&book_id.to_string()).await {
            warn!(book_id = %book_id, error = %e, "failed to delete blob prefix after row delete");
        }
        Ok(())
    }

    /// Boot-time reconciliation sweep (spec §4.6, closing the gap it
    /// names): re-enqueues any book stuck in `Pending` with no
    /// corresponding `extract` queue row, recovering from a crash between
    /// the row insert and the enqueue.
    pub async fn reconcile_pending_books(&self) -> Result<u32, DomainError> {
        let pending = self.metadata_store.list_pending_books().await?;
        let mut reenqueued = 0;
        for book in pending {
            self.queue_broker.enqueue(Stage::Extract.queue_name(), Job::new(book.id.clone())).await?;
            reenqueued += 1;
        }
        if reenqueued > 0 {
            info!(count = reenqueued, "reconciliation sweep re-enqueued pending books");
        }
        Ok(reenqueued)
    }
}
