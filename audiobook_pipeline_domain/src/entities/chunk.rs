// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The `Chunk` entity: one audio segment belonging to a `Book` (spec §3.1).

use serde::{Deserialize, Serialize};

use crate::value_objects::BookId;

/// Target segment duration in seconds (spec §9 open question 3: fixed at
/// 3.14s; the final chunk of a book may be shorter).
pub const TARGET_CHUNK_DURATION_S: f64 = 3.14;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub book_id: BookId,
    pub seq: u32,
    pub duration_s: f64,
    pub byte_size: u64,
    pub blob_path: String,
}

impl Chunk {
    pub fn new(book_id: BookId, seq: u32, duration_s: f64, byte_size: u64, blob_path: String) -> Self {
        Self {
            book_id,
            seq,
            duration_s,
            byte_size,
            blob_path,
        }
    }

    /// Canonical blob path for a chunk's final artifact (spec §3.1).
    pub fn blob_path_for(book_id: &BookId, seq: u32, codec_ext: &str) -> String {
        format!("{}/chunks/{}.{}", book_id, seq, codec_ext)
    }
}

/// Validates that a set of sequence numbers is exactly `{0, ..., n-1}` with
/// no gaps or duplicates (spec §3.2 invariant 2, checked on `Completed`).
pub fn is_contiguous(mut seqs: Vec<u32>, total_chunks: u32) -> bool {
    seqs.sort_unstable();
    seqs.dedup();
    seqs.len() as u32 == total_chunks && seqs.iter().enumerate().all(|(i, &s)| i as u32 == s)
}
