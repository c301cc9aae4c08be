// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The four concrete `StageHandler`s (spec §4.4 step 5), each delegating
//! to its corresponding out-of-scope collaborator and writing artifacts to
//! the paths `Chunk`/the Artifact convention name (spec §3.1).
//!
//! The segment count isn't known until `SegmentHandler` runs and isn't a
//! `Book` column (only `total_chunks`, set by Package, is); it is recorded
//! as a small blob manifest at `<book_id>/segments/count` so a redelivered
//! Synthesize or Package job recovers it without a metadata store column
//! that would otherwise exist only for this one intermediate value.

use async_trait::async_trait;
use std::sync::Arc;

use audiobook_pipeline_domain::{
    BlobStore, BookId, Chunk, DomainError, MetadataStore, Packager, Segmenter, StageError, StageHandler, Synthesizer,
    TextExtractor, TextSegment,
};

use super::super::collaborators::wav::read_wav;

fn segment_count_path(book_id: &BookId) -> String {
    format!("{book_id}/segments/count")
}

async fn read_segment_count(blob_store: &dyn BlobStore, book_id: &BookId) -> Result<u32, DomainError> {
    let bytes = blob_store.get(&segment_count_path(book_id)).await?;
    let raw = String::from_utf8(bytes).map_err(|e| DomainError::Integrity(format!("malformed segment count manifest: {e}")))?;
    raw.trim()
        .parse()
        .map_err(|e| DomainError::Integrity(format!("malformed segment count manifest: {e}")))
}

pub struct ExtractHandler {
    blob_store: Arc<dyn BlobStore>,
    metadata_store: Arc<dyn MetadataStore>,
    extractor: Arc<dyn TextExtractor>,
}

impl ExtractHandler {
    pub fn new(blob_store: Arc<dyn BlobStore>, metadata_store: Arc<dyn MetadataStore>, extractor: Arc<dyn TextExtractor>) -> Self {
        Self {
            blob_store,
            metadata_store,
            extractor,
        }
    }
}

#[async_trait]
impl StageHandler for ExtractHandler {
    fn name(&self) -> &'static str {
        "extract"
    }

    async fn run(&self, book_id: &BookId) -> Result<(), StageError> {
        let book = self.metadata_store.get_book(book_id).await?;
        let source_path = format!("{book_id}/source.{}", book.format.extension());
        let extracted = self.extractor.extract(&source_path, book.format).await?;
        self.blob_store
            .put(&format!("{book_id}/text.txt"), extracted.content.into_bytes())
            .await?;
        Ok(())
    }
}

pub struct SegmentHandler {
    blob_store: Arc<dyn BlobStore>,
    segmenter: Arc<dyn Segmenter>,
}

impl SegmentHandler {
    pub fn new(blob_store: Arc<dyn BlobStore>, segmenter: Arc<dyn Segmenter>) -> Self {
        Self { blob_store, segmenter }
    }
}

#[async_trait]
impl StageHandler for SegmentHandler {
    fn name(&self) -> &'static str {
        "segment"
    }

    async fn run(&self, book_id: &BookId) -> Result<(), StageError> {
        let text_bytes = self.blob_store.get(&format!("{book_id}/text.txt")).await?;
        let content = String::from_utf8(text_bytes).map_err(|e| StageError::fatal(format!("extracted text is not valid UTF-8: {e}")))?;
        let extracted = audiobook_pipeline_domain::ExtractedText { content };

        let segments = self.segmenter.segment(&extracted).await?;
        for segment in &segments {
            self.blob_store
                .put(&format!("{book_id}/segments/{}.mark", segment.seq), segment.text.clone().into_bytes())
                .await?;
        }
        self.blob_store
            .put(&segment_count_path(book_id), segments.len().to_string().into_bytes())
            .await?;
        Ok(())
    }
}

pub struct SynthesizeHandler {
    blob_store: Arc<dyn BlobStore>,
    synthesizer: Arc<dyn Synthesizer>,
}

impl SynthesizeHandler {
    pub fn new(blob_store: Arc<dyn BlobStore>, synthesizer: Arc<dyn Synthesizer>) -> Self {
        Self { blob_store, synthesizer }
    }
}

#[async_trait]
impl StageHandler for SynthesizeHandler {
    fn name(&self) -> &'static str {
        "synthesize"
    }

    async fn run(&self, book_id: &BookId) -> Result<(), StageError> {
        let count = read_segment_count(self.blob_store.as_ref(), book_id).await?;
        for seq in 0..count {
            let mark_bytes = self.blob_store.get(&format!("{book_id}/segments/{seq}.mark")).await?;
            let text = String::from_utf8(mark_bytes).map_err(|e| StageError::fatal(format!("segment {seq} is not valid UTF-8: {e}")))?;
            let audio = self.synthesizer.synthesize(&TextSegment { seq, text }).await?;
            self.blob_store
                .put(&format!("{book_id}/raw/{seq}.{}", audio.codec_ext), audio.bytes.to_vec())
                .await?;
        }
        Ok(())
    }
}

pub struct PackageHandler {
    blob_store: Arc<dyn BlobStore>,
    metadata_store: Arc<dyn MetadataStore>,
    packager: Arc<dyn Packager>,
    chunk_ext: &'static str,
}

impl PackageHandler {
    pub fn new(blob_store: Arc<dyn BlobStore>, metadata_store: Arc<dyn MetadataStore>, packager: Arc<dyn Packager>, chunk_ext: &'static str) -> Self {
        Self {
            blob_store,
            metadata_store,
            packager,
            chunk_ext,
        }
    }
}

#[async_trait]
impl StageHandler for PackageHandler {
    fn name(&self) -> &'static str {
        "package"
    }

    async fn run(&self, book_id: &BookId) -> Result<(), StageError> {
        let count = read_segment_count(self.blob_store.as_ref(), book_id).await?;
        self.packager.package(&book_id.to_string(), count).await?;

        for seq in 0..count {
            let raw_bytes = self.blob_store.get(&format!("{book_id}/raw/{seq}.wav")).await?;
            let (duration_s, _pcm) = read_wav(&raw_bytes)?;

            let chunk_path = Chunk::blob_path_for(book_id, seq, self.chunk_ext);
            let stat = self.blob_store.stat(&chunk_path).await?;

            let chunk = Chunk::new(book_id.clone(), seq, duration_s, stat.size, chunk_path);
            self.metadata_store.upsert_chunk(&chunk).await?;
        }
        self.metadata_store.set_total_chunks(book_id, count).await?;
        Ok(())
    }
}
