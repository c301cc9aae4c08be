// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Stand-in `Synthesizer`: deterministically renders each segment to a
//! silence-PCM WAV whose duration is proportional to its character count,
//! clamped to `TARGET_CHUNK_DURATION_S` (spec §4.4). Keeps the pipeline
//! runnable end-to-end without a real TTS dependency; not a claim of audio
//! quality.

use async_trait::async_trait;

use audiobook_pipeline_domain::{DomainError, Synthesizer, SynthesizedAudio, TextSegment, TARGET_CHUNK_DURATION_S};

use super::wav::{pcm_bytes_for_duration, write_wav};

const ASSUMED_CHARS_PER_SECOND: f64 = 15.0;
const MIN_DURATION_S: f64 = 0.1;

pub struct SilenceSynthesizer;

impl SilenceSynthesizer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SilenceSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Synthesizer for SilenceSynthesizer {
    async fn synthesize(&self, segment: &TextSegment) -> Result<SynthesizedAudio, DomainError> {
        if segment.text.trim().is_empty() {
            return Err(DomainError::Fatal(format!("segment {} has no text to synthesize", segment.seq)));
        }
        let estimated = segment.text.chars().count() as f64 / ASSUMED_CHARS_PER_SECOND;
        let duration_s = estimated.clamp(MIN_DURATION_S, TARGET_CHUNK_DURATION_S);

        let pcm = pcm_bytes_for_duration(duration_s);
        let wav = write_wav(&pcm);

        Ok(SynthesizedAudio {
            seq: segment.seq,
            bytes: bytes::Bytes::from(wav),
            duration_s,
            codec_ext: "wav",
        })
    }
}
