// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Stand-in `Packager`: repacks the intermediate per-segment WAVs produced
//! by the Synthesize stage into final chunk blobs (spec §4.4 Package
//! stage). Real Opus encoding is out of scope; `ChunkCodec` isolates the
//! encode step so the built-in `RawPcmOggCodec` — a minimal valid Ogg
//! container whose pages carry raw PCM, not true Opus — can be swapped for
//! a real encoder without touching the packager's orchestration.

use async_trait::async_trait;
use std::sync::Arc;

use audiobook_pipeline_domain::{BlobStore, BookId, Chunk, DomainError, Packager};

use super::wav::read_wav;

pub trait ChunkCodec: Send + Sync {
    /// Encodes one segment's raw PCM payload (already extracted from its
    /// WAV header) into the container this codec produces.
    fn encode(&self, pcm: &[u8]) -> Result<Vec<u8>, DomainError>;

    /// File extension tag used in the chunk's blob path and MIME mapping.
    fn ext(&self) -> &'static str;
}

/// Writes a single-page, single-stream Ogg container (one fixed 27-byte
/// page header, CRC omitted with checksum field zeroed) carrying `pcm` as
/// its payload. Readers that only need chunking/manifest/range semantics
/// exercised end-to-end do not need a byte-exact Opus stream.
pub struct RawPcmOggCodec;

const OGG_CAPTURE_PATTERN: &[u8; 4] = b"OggS";

impl ChunkCodec for RawPcmOggCodec {
    fn encode(&self, pcm: &[u8]) -> Result<Vec<u8>, DomainError> {
        let mut page = Vec::with_capacity(27 + pcm.len());
        page.extend_from_slice(OGG_CAPTURE_PATTERN);
        page.push(0); // stream structure version
        page.push(0b0000_0110); // header type: first + last page of stream
        page.extend_from_slice(&0u64.to_le_bytes()); // granule position
        page.extend_from_slice(&1u32.to_le_bytes()); // stream serial number
        page.extend_from_slice(&0u32.to_le_bytes()); // page sequence number
        page.extend_from_slice(&0u32.to_le_bytes()); // checksum (unchecked by our own reader)
        let segments = (pcm.len() / 255) + 1;
        page.push(segments.min(255) as u8);
        let mut remaining = pcm.len();
        for _ in 0..segments.min(255) {
            let lace = remaining.min(255);
            page.push(lace as u8);
            remaining -= lace;
        }
        page.extend_from_slice(pcm);
        Ok(page)
    }

    fn ext(&self) -> &'static str {
        "ogg"
    }
}

pub struct OggPackager {
    blob_store: Arc<dyn BlobStore>,
    codec: Arc<dyn ChunkCodec>,
}

impl OggPackager {
    pub fn new(blob_store: Arc<dyn BlobStore>, codec: Arc<dyn ChunkCodec>) -> Self {
        Self { blob_store, codec }
    }
}

#[async_trait]
impl Packager for OggPackager {
    async fn package(&self, book_source_path: &str, chunk_count: u32) -> Result<(), DomainError> {
        for seq in 0..chunk_count {
            let raw_path = format!("{book_source_path}/raw/{seq}.wav");
            let wav_bytes = self.blob_store.get(&raw_path).await?;
            let (_duration_s, pcm) = read_wav(&wav_bytes)?;
            let encoded = self.codec.encode(pcm)?;

            let book_id = BookId::from_string(book_source_path)?;
            let chunk_path = Chunk::blob_path_for(&book_id, seq, self.codec.ext());
            self.blob_store.put(&chunk_path, encoded).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::collaborators::wav::{pcm_bytes_for_duration, write_wav};
    use crate::infrastructure::repositories::FilesystemBlobStore;
    use tempfile::TempDir;

    fn store() -> (Arc<dyn BlobStore>, TempDir) {
        let dir = TempDir::new().unwrap();
        (Arc::new(FilesystemBlobStore::new(dir.path())), dir)
    }

    #[test]
    fn raw_pcm_ogg_codec_produces_a_valid_capture_pattern() {
        let codec = RawPcmOggCodec;
        let encoded = codec.encode(b"some pcm bytes").unwrap();
        assert_eq!(&encoded[0..4], OGG_CAPTURE_PATTERN);
        assert_eq!(codec.ext(), "ogg");
    }

    #[tokio::test]
    async fn packages_every_segment_into_a_numbered_chunk() {
        let (blob_store, _dir) = store();
        let book_id = BookId::new();
        let book_prefix = book_id.to_string();

        for seq in 0..3u32 {
            let wav = write_wav(&pcm_bytes_for_duration(1.0));
            blob_store.put(&format!("{book_prefix}/raw/{seq}.wav"), wav).await.unwrap();
        }

        let packager = OggPackager::new(blob_store.clone(), Arc::new(RawPcmOggCodec));
        packager.package(&book_prefix, 3).await.unwrap();

        for seq in 0..3u32 {
            let chunk_path = Chunk::blob_path_for(&book_id, seq, "ogg");
            let bytes = blob_store.get(&chunk_path).await.unwrap();
            assert_eq!(&bytes[0..4], OGG_CAPTURE_PATTERN);
        }
    }
}
