// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Built-in stand-ins for the four out-of-scope external collaborators
//! (spec §1, §4.4): document extraction, segmentation, synthesis, and
//! packaging.

pub mod heuristic_segmenter;
pub mod ogg_packager;
pub mod silence_synthesizer;
pub mod txt_extractor;
pub mod wav;

pub use heuristic_segmenter::HeuristicSegmenter;
pub use ogg_packager::{ChunkCodec, OggPackager, RawPcmOggCodec};
pub use silence_synthesizer::SilenceSynthesizer;
pub use txt_extractor::TxtTextExtractor;
