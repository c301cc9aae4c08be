// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Minimal PCM WAV (RIFF) encode/decode shared by the stand-in Synthesizer
//! and Packager. `duration_s` for a chunk is recovered by reading the
//! `data` chunk's byte length back out of the header rather than threading
//! it through the Queue Broker, so a redelivered Package job recomputes the
//! same value every time (spec §4.4 step 5's repeatability requirement).

use audiobook_pipeline_domain::DomainError;

pub const SAMPLE_RATE: u32 = 16_000;
pub const CHANNELS: u16 = 1;
pub const BITS_PER_SAMPLE: u16 = 16;

pub fn write_wav(pcm: &[u8]) -> Vec<u8> {
    let byte_rate = SAMPLE_RATE * CHANNELS as u32 * (BITS_PER_SAMPLE as u32 / 8);
    let block_align = CHANNELS * (BITS_PER_SAMPLE / 8);
    let data_len = pcm.len() as u32;
    let riff_len = 36 + data_len;

    let mut out = Vec::with_capacity(44 + pcm.len());
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&riff_len.to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&CHANNELS.to_le_bytes());
    out.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.extend_from_slice(pcm);
    out
}

pub fn pcm_bytes_for_duration(duration_s: f64) -> Vec<u8> {
    let frames = (duration_s * SAMPLE_RATE as f64).round().max(1.0) as usize;
    vec![0u8; frames * CHANNELS as usize * (BITS_PER_SAMPLE as usize / 8)]
}

/// Returns `(duration_s, data_chunk)`, the latter for callers (the stand-in
/// codec) that need the raw PCM payload without the RIFF header.
pub fn read_wav(bytes: &[u8]) -> Result<(f64, &[u8]), DomainError> {
    if bytes.len() < 44 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(DomainError::Integrity("malformed wav artifact: missing RIFF/WAVE header".into()));
    }
    let data_len = u32::from_le_bytes(bytes[40..44].try_into().unwrap()) as usize;
    let data = bytes
        .get(44..44 + data_len)
        .ok_or_else(|| DomainError::Integrity("malformed wav artifact: data chunk truncated".into()))?;
    let bytes_per_frame = CHANNELS as usize * (BITS_PER_SAMPLE as usize / 8);
    let frames = data.len() / bytes_per_frame.max(1);
    let duration_s = frames as f64 / SAMPLE_RATE as f64;
    Ok((duration_s, data))
}
