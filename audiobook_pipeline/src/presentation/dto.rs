// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Wire request/response shapes for the HTTP surface (spec §6.1). Kept
//! separate from the domain entities: a `Book` is an internal record with
//! ownership fields a client never needs to see, and an upload is not yet
//! a validated `Book` until `IngestGateway::submit_book` has run.

use serde::{Deserialize, Serialize};

use audiobook_pipeline_domain::{Book, Chunk};

#[derive(Debug, Serialize)]
pub struct BookCreatedResponse {
    pub book_id: String,
    pub state: &'static str,
}

#[derive(Debug, Serialize)]
pub struct BookSummary {
    pub id: String,
    pub title: String,
    pub format: String,
    pub state: String,
    pub percent_complete: u8,
    pub total_chunks: Option<u32>,
    pub created_at: String,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.to_string(),
            title: book.title.clone(),
            format: book.format.to_string(),
            state: book.state.to_string(),
            percent_complete: book.percent_complete.get(),
            total_chunks: book.total_chunks,
            created_at: book.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BooksResponse {
    pub books: Vec<BookSummary>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub state: String,
    pub percent_complete: u8,
    pub error: Option<String>,
    pub total_chunks: Option<u32>,
}

impl From<&Book> for StatusResponse {
    fn from(book: &Book) -> Self {
        Self {
            state: book.state.to_string(),
            percent_complete: book.percent_complete.get(),
            error: book.error_message.clone(),
            total_chunks: book.total_chunks,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChunkManifestEntry {
    pub seq: u32,
    pub duration_s: f64,
    pub byte_size: u64,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ChunkManifestResponse {
    pub total_chunks: u32,
    pub total_duration_s: f64,
    pub chunks: Vec<ChunkManifestEntry>,
}

impl ChunkManifestResponse {
    pub fn from_chunks(chunks: &[Chunk], url_for: impl Fn(u32) -> String) -> Self {
        let total_duration_s = chunks.iter().map(|c| c.duration_s).sum();
        let entries = chunks
            .iter()
            .map(|c| ChunkManifestEntry {
                seq: c.seq,
                duration_s: c.duration_s,
                byte_size: c.byte_size,
                url: url_for(c.seq),
            })
            .collect();
        Self {
            total_chunks: chunks.len() as u32,
            total_duration_s,
            chunks: entries,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignedUrlResponse {
    pub signed_url: String,
    pub expires_in: u64,
}

#[derive(Debug, Serialize)]
pub struct BatchSignedUrlEntry {
    pub seq: u32,
    pub signed_url: String,
    pub expires_in: u64,
}

#[derive(Debug, Serialize)]
pub struct BatchSignedUrlsResponse {
    pub urls: Vec<BatchSignedUrlEntry>,
}

#[derive(Debug, Deserialize)]
pub struct BatchSignedUrlsRequest {
    pub seqs: Vec<u32>,
    pub ttl_s: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SignedUrlRequest {
    pub ttl_s: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}
