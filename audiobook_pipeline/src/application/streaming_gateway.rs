// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Streaming Gateway (spec §4.7): read path over Metadata Store + Blob
//! Store, plus the signed-URL issuance that lets a client replay a chunk
//! without a session token.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::stream::BoxStream;

use audiobook_pipeline_domain::{
    Book, BookId, BlobStore, ByteChunk, Chunk, DomainError, MetadataStore, Paging, SignedUrlClaims, SigningService, UserId,
};

use crate::error::{CoreError, CoreResult};

/// An open byte range on a chunk, inclusive on both ends, resolved against
/// the chunk's actual `byte_size` (spec §8.4 boundary behaviors).
#[derive(Debug, Clone, Copy)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

pub struct ChunkStream {
    pub body: BoxStream<'static, ByteChunk>,
    pub range: Option<ByteRange>,
    pub total_size: u64,
}

pub struct StreamingGateway {
    metadata_store: Arc<dyn MetadataStore>,
    blob_store: Arc<dyn BlobStore>,
    signing_service: Arc<dyn SigningService>,
    default_signed_url_ttl: Duration,
}

impl StreamingGateway {
    pub fn new(
        metadata_store: Arc<dyn MetadataStore>,
        blob_store: Arc<dyn BlobStore>,
        signing_service: Arc<dyn SigningService>,
        default_signed_url_ttl: Duration,
    ) -> Self {
        Self {
            metadata_store,
            blob_store,
            signing_service,
            default_signed_url_ttl,
        }
    }

    pub async fn list_books(&self, owner: &UserId, paging: Paging) -> CoreResult<Vec<Book>> {
        Ok(self.metadata_store.list_books_for_owner(owner, paging).await?)
    }

    pub async fn get_status(&self, owner: &UserId, book_id: &BookId) -> CoreResult<Book> {
        self.owned_book(owner, book_id).await
    }

    /// `GetChunkManifest` (spec §6.1): 409 if the book has not reached
    /// `Completed` yet, since `total_chunks`/chunk rows are only final once
    /// the Packager stage has run.
    pub async fn get_chunk_manifest(&self, owner: &UserId, book_id: &BookId) -> CoreResult<Vec<Chunk>> {
        let book = self.owned_book(owner, book_id).await?;
        if !book.is_completed() {
            return Err(CoreError::NotCompleted(format!("book {book_id} is still {}", book.state)));
        }
        Ok(self.metadata_store.list_chunks(book_id).await?)
    }

    /// `StreamChunk` (spec §4.7): accepts either a session token (checked by
    /// the caller before reaching here, via `owner`) or a valid signed URL
    /// (checked via `stream_chunk_signed`). Honors an optional HTTP `Range`.
    pub async fn stream_chunk(&self, owner: &UserId, book_id: &BookId, seq: u32, range: Option<ByteRange>) -> CoreResult<ChunkStream> {
        self.owned_book(owner, book_id).await?;
        self.read_chunk(book_id, seq, range).await
    }

    /// Same read path as `stream_chunk`, but authorized by a signed-URL
    /// token instead of a session + ownership check (spec §4.7: "`book_id`
    /// → blob lookup still happens", i.e. the token alone does not bypass
    /// `Chunk` existence checks, only the `Book` ownership check).
    pub async fn stream_chunk_signed(&self, token: &str, book_id: &BookId, seq: u32, range: Option<ByteRange>) -> CoreResult<ChunkStream> {
        let claims = self.signing_service.verify(token)?;
        if claims.book_id != *book_id || claims.seq != seq {
            return Err(DomainError::Unauthenticated("signed url does not authorize this resource".into()).into());
        }
        self.read_chunk(book_id, seq, range).await
    }

    pub async fn issue_signed_chunk_url(&self, owner: &UserId, book_id: &BookId, seq: u32, ttl: Option<Duration>) -> CoreResult<(String, Duration)> {
        self.owned_book(owner, book_id).await?;
        self.ensure_chunk_exists(book_id, seq).await?;

        let ttl = ttl.unwrap_or(self.default_signed_url_ttl);
        let claims = SignedUrlClaims {
            book_id: book_id.clone(),
            seq,
            expires_at: Utc::now() + chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::seconds(0)),
        };
        Ok((self.signing_service.sign(&claims), ttl))
    }

    pub async fn issue_batch_signed_urls(&self, owner: &UserId, book_id: &BookId, seqs: &[u32], ttl: Option<Duration>) -> CoreResult<Vec<(u32, String, Duration)>> {
        self.owned_book(owner, book_id).await?;
        let mut urls = Vec::with_capacity(seqs.len());
        for &seq in seqs {
            self.ensure_chunk_exists(book_id, seq).await?;
            let ttl = ttl.unwrap_or(self.default_signed_url_ttl);
            let claims = SignedUrlClaims {
                book_id: book_id.clone(),
                seq,
                expires_at: Utc::now() + chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::seconds(0)),
            };
            urls.push((seq, self.signing_service.sign(&claims), ttl));
        }
        Ok(urls)
    }

    async fn owned_book(&self, owner: &UserId, book_id: &BookId) -> CoreResult<Book> {
        let book = self.metadata_store.get_book(book_id).await?;
        if !book.is_owned_by(owner) {
            // Collapses to the same NotFound the caller sees for a book
            // that genuinely does not exist (spec §4.8 existence-leak rule).
            return Err(DomainError::NotFound(format!("book {book_id}")).into());
        }
        Ok(book)
    }

    async fn ensure_chunk_exists(&self, book_id: &BookId, seq: u32) -> CoreResult<Chunk> {
        self.metadata_store
            .list_chunks(book_id)
            .await?
            .into_iter()
            .find(|c| c.seq == seq)
            .ok_or_else(|| DomainError::NotFound(format!("chunk {seq} of book {book_id}")).into())
    }

    async fn read_chunk(&self, book_id: &BookId, seq: u32, range: Option<ByteRange>) -> CoreResult<ChunkStream> {
        let chunk = self.ensure_chunk_exists(book_id, seq).await?;

        let resolved_range = match range {
            None => None,
            Some(requested) => Some(self.resolve_range(requested, chunk.byte_size)?),
        };

        let (offset, length) = match resolved_range {
            Some(r) => (r.start, r.end - r.start + 1),
            None => (0, chunk.byte_size),
        };

        let body = self.blob_store.open_range(&chunk.blob_path, offset, length).await?;
        Ok(ChunkStream {
            body,
            range: resolved_range,
            total_size: chunk.byte_size,
        })
    }

    /// Clamps and validates a requested range against the chunk's actual
    /// size (spec §8.4): `bytes=0-0` is a valid one-byte range; a start at
    /// or beyond `byte_size` is 416.
    fn resolve_range(&self, requested: ByteRange, byte_size: u64) -> Result<ByteRange, CoreError> {
        if byte_size == 0 || requested.start >= byte_size {
            return Err(CoreError::RangeNotSatisfiable(format!(
                "range {}-{} is outside the chunk's {} bytes",
                requested.start, requested.end, byte_size
            )));
        }
        let end = requested.end.min(byte_size - 1);
        if end < requested.start {
            return Err(CoreError::RangeNotSatisfiable(format!("range {}-{} is empty", requested.start, requested.end)));
        }
        Ok(ByteRange { start: requested.start, end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::{initialize_database, FilesystemBlobStore, SqliteMetadataStore};
    use crate::infrastructure::security::HmacSigningService;
    use audiobook_pipeline_domain::{BookFormat, BookState, Percent};
    use futures::StreamExt;
    use tempfile::{NamedTempFile, TempDir};

    async fn gateway_with_a_completed_book() -> (StreamingGateway, UserId, BookId, TempDir) {
        let temp_db = NamedTempFile::new().unwrap();
        let db_url = format!("sqlite://{}", temp_db.path().to_str().unwrap());
        drop(temp_db);
        let pool = initialize_database(&db_url).await.unwrap();

        let blob_dir = TempDir::new().unwrap();
        let blob_store: Arc<dyn BlobStore> = Arc::new(FilesystemBlobStore::new(blob_dir.path()));
        let metadata_store: Arc<dyn MetadataStore> = Arc::new(SqliteMetadataStore::new(pool));
        let signing_service: Arc<dyn SigningService> = Arc::new(HmacSigningService::new(b"0123456789abcdef0123456789abcdef"));

        let owner = UserId::new();
        let book = Book::new(owner.clone(), "Hello".to_string(), BookFormat::Txt).unwrap();
        metadata_store.create_book(&book).await.unwrap();
        metadata_store
            .update_book_state(&book.id, BookState::Pending, BookState::Completed, Some(Percent::new(100).unwrap()), None)
            .await
            .unwrap();
        metadata_store.set_total_chunks(&book.id, 1).await.unwrap();

        let chunk_bytes = b"0123456789".to_vec();
        let blob_path = Chunk::blob_path_for(&book.id, 0, "ogg");
        blob_store.put(&blob_path, chunk_bytes.clone()).await.unwrap();
        metadata_store
            .upsert_chunk(&Chunk::new(book.id.clone(), 0, 3.14, chunk_bytes.len() as u64, blob_path))
            .await
            .unwrap();

        let gateway = StreamingGateway::new(metadata_store, blob_store, signing_service, Duration::from_secs(3600));
        (gateway, owner, book.id, blob_dir)
    }

    #[tokio::test]
    async fn manifest_is_available_once_completed() {
        let (gateway, owner, book_id, _dir) = gateway_with_a_completed_book().await;
        let chunks = gateway.get_chunk_manifest(&owner, &book_id).await.unwrap();
        assert_eq!(chunks.len(), 1);
    }

    #[tokio::test]
    async fn manifest_is_conflict_before_completion() {
        let (gateway, owner, book_id, _dir) = gateway_with_a_completed_book().await;
        let pending_owner = UserId::new();
        let book = Book::new(pending_owner.clone(), "Other".to_string(), BookFormat::Txt).unwrap();
        gateway.metadata_store.create_book(&book).await.unwrap();

        let err = gateway.get_chunk_manifest(&pending_owner, &book.id).await.unwrap_err();
        assert!(matches!(err, CoreError::NotCompleted(_)));
        let _ = book_id;
    }

    #[tokio::test]
    async fn a_non_owner_sees_not_found_not_a_separate_forbidden_status() {
        let (gateway, _owner, book_id, _dir) = gateway_with_a_completed_book().await;
        let err = gateway.get_status(&UserId::new(), &book_id).await.unwrap_err();
        assert!(matches!(err, CoreError::Domain(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn streaming_the_full_chunk_returns_all_bytes() {
        let (gateway, owner, book_id, _dir) = gateway_with_a_completed_book().await;
        let mut stream = gateway.stream_chunk(&owner, &book_id, 0, None).await.unwrap();
        let mut collected = Vec::new();
        while let Some(chunk) = stream.body.next().await {
            collected.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(collected, b"0123456789");
        assert!(stream.range.is_none());
    }

    #[tokio::test]
    async fn a_single_byte_range_at_zero_zero_is_satisfiable() {
        let (gateway, owner, book_id, _dir) = gateway_with_a_completed_book().await;
        let stream = gateway
            .stream_chunk(&owner, &book_id, 0, Some(ByteRange { start: 0, end: 0 }))
            .await
            .unwrap();
        let range = stream.range.unwrap();
        assert_eq!((range.start, range.end), (0, 0));
    }

    #[tokio::test]
    async fn a_range_starting_at_byte_size_is_not_satisfiable() {
        let (gateway, owner, book_id, _dir) = gateway_with_a_completed_book().await;
        let err = gateway
            .stream_chunk(&owner, &book_id, 0, Some(ByteRange { start: 10, end: 10 }))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::RangeNotSatisfiable(_)));
    }

    #[tokio::test]
    async fn a_signed_url_authorizes_the_same_chunk_only() {
        let (gateway, owner, book_id, _dir) = gateway_with_a_completed_book().await;
        let (token, _ttl) = gateway.issue_signed_chunk_url(&owner, &book_id, 0, None).await.unwrap();

        assert!(gateway.stream_chunk_signed(&token, &book_id, 0, None).await.is_ok());

        let other_book = BookId::new();
        let err = gateway.stream_chunk_signed(&token, &other_book, 0, None).await.unwrap_err();
        assert!(matches!(err, CoreError::Domain(DomainError::Unauthenticated(_))));
    }

    #[tokio::test]
    async fn batch_signed_urls_cover_every_requested_seq() {
        let (gateway, owner, book_id, _dir) = gateway_with_a_completed_book().await;
        let urls = gateway.issue_batch_signed_urls(&owner, &book_id, &[0], None).await.unwrap();
        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0].0, 0);
    }
}
