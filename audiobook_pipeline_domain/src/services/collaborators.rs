// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Per-stage collaborator contracts (spec §4.4, step 5). Each stage's
//! `StageHandler` implementation delegates the actual transformation to one
//! of these: text extraction, segmentation, speech synthesis, and
//! packaging. Splitting them out of `StageHandler` keeps the runner-facing
//! retry/percent bookkeeping separate from the swappable, format-specific
//! work, and lets the core crate ship a stand-in `Synthesizer` (spec's
//! Open Question on TTS backend) without touching the stage loop.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::value_objects::BookFormat;

/// A single unit of extracted, plain-text narration content, in reading
/// order. Segmentation later slices this into chunk-sized spans.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub content: String,
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Whether this extractor handles `format`.
    fn supports(&self, format: BookFormat) -> bool;

    async fn extract(&self, source_path: &str, format: BookFormat) -> Result<ExtractedText, DomainError>;
}

/// A contiguous span of text destined for one audio chunk.
#[derive(Debug, Clone)]
pub struct TextSegment {
    pub seq: u32,
    pub text: String,
}

#[async_trait]
pub trait Segmenter: Send + Sync {
    /// Splits `text` into segments sized for roughly `Chunk::TARGET_CHUNK_DURATION_S`
    /// of narrated audio each (spec §3.2, segmentation heuristics are
    /// implementation-defined).
    async fn segment(&self, text: &ExtractedText) -> Result<Vec<TextSegment>, DomainError>;
}

/// Synthesized audio for one segment, already encoded.
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    pub seq: u32,
    pub bytes: bytes::Bytes,
    pub duration_s: f64,
    pub codec_ext: &'static str,
}

#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, segment: &TextSegment) -> Result<SynthesizedAudio, DomainError>;
}

#[async_trait]
pub trait Packager: Send + Sync {
    /// Concatenates/finalizes the already-stored per-chunk audio into
    /// whatever the streaming gateway serves (spec §4.4 Package stage,
    /// §6.4 range requests over the packaged output).
    async fn package(&self, book_source_path: &str, chunk_count: u32) -> Result<(), DomainError>;
}
