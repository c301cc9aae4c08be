// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Blob Store contract (spec §4.2): content-addressed-by-convention
//! filesystem tree for every artifact the pipeline produces, from the raw
//! upload through to the final chunk files.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::DomainError;

pub struct BlobStat {
    pub size: u64,
    pub modified: chrono::DateTime<chrono::Utc>,
}

/// A chunk of bytes from an open range read, or an I/O error mid-stream.
pub type ByteChunk = Result<bytes::Bytes, DomainError>;

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Writes `bytes` atomically: the implementation must write to a
    /// temporary name under the same prefix and rename into place so `get`
    /// never observes a partial write.
    async fn put(&self, path: &str, bytes: Vec<u8>) -> Result<(), DomainError>;

    async fn get(&self, path: &str) -> Result<Vec<u8>, DomainError>;

    /// Streams `length` bytes starting at `offset` without buffering the
    /// whole blob, for range-able HTTP responses.
    async fn open_range(&self, path: &str, offset: u64, length: u64) -> Result<BoxStream<'static, ByteChunk>, DomainError>;

    /// Recursively deletes everything under `prefix`. Idempotent: deleting
    /// an absent prefix is not an error.
    async fn delete(&self, prefix: &str) -> Result<(), DomainError>;

    async fn stat(&self, path: &str) -> Result<BlobStat, DomainError>;
}
