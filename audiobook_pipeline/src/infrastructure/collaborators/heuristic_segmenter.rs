// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Stand-in `Segmenter`: splits on sentence-ending punctuation and
//! whitespace, then groups consecutive sentences up to a character budget
//! approximating `TARGET_CHUNK_DURATION_S` of narration (spec §4.4).

use async_trait::async_trait;

use audiobook_pipeline_domain::{DomainError, ExtractedText, Segmenter, TextSegment, TARGET_CHUNK_DURATION_S};

/// Assumed narration rate in characters per second, used only to size
/// segments; the real Synthesizer (out of scope) would report actual
/// timing.
const ASSUMED_CHARS_PER_SECOND: f64 = 15.0;

fn segment_char_budget() -> usize {
    (TARGET_CHUNK_DURATION_S * ASSUMED_CHARS_PER_SECOND).round() as usize
}

pub struct HeuristicSegmenter;

impl HeuristicSegmenter {
    pub fn new() -> Self {
        Self
    }

    fn split_sentences(text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut current = String::new();
        for ch in text.chars() {
            current.push(ch);
            if matches!(ch, '.' | '!' | '?') {
                let trimmed = current.trim();
                if !trimmed.is_empty() {
                    sentences.push(trimmed.to_string());
                }
                current.clear();
            }
        }
        let trailing = current.trim();
        if !trailing.is_empty() {
            sentences.push(trailing.to_string());
        }
        sentences
    }
}

impl Default for HeuristicSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Segmenter for HeuristicSegmenter {
    async fn segment(&self, text: &ExtractedText) -> Result<Vec<TextSegment>, DomainError> {
        let budget = segment_char_budget();
        let sentences = Self::split_sentences(&text.content);
        if sentences.is_empty() {
            return Err(DomainError::Fatal("no sentences found in extracted text".into()));
        }

        let mut segments = Vec::new();
        let mut current = String::new();
        for sentence in sentences {
            if !current.is_empty() && current.len() + 1 + sentence.len() > budget {
                segments.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&sentence);
        }
        if !current.is_empty() {
            segments.push(current);
        }

        Ok(segments
            .into_iter()
            .enumerate()
            .map(|(seq, text)| TextSegment { seq: seq as u32, text })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn splits_multiple_sentences_into_one_or_more_segments() {
        let segmenter = HeuristicSegmenter::new();
        let text = ExtractedText {
            content: "This is one sentence. This is another! And a third?".to_string(),
        };
        let segments = segmenter.segment(&text).await.unwrap();
        assert!(!segments.is_empty());
        for (i, segment) in segments.iter().enumerate() {
            assert_eq!(segment.seq, i as u32);
        }
    }

    #[tokio::test]
    async fn long_text_produces_multiple_segments_within_budget() {
        let segmenter = HeuristicSegmenter::new();
        let sentence = "The quick brown fox jumps over the lazy dog. ".repeat(20);
        let text = ExtractedText { content: sentence };
        let segments = segmenter.segment(&text).await.unwrap();
        assert!(segments.len() > 1);
    }

    #[tokio::test]
    async fn rejects_text_with_no_sentence_punctuation_and_nothing_left() {
        let segmenter = HeuristicSegmenter::new();
        let text = ExtractedText { content: "   ".to_string() };
        assert!(segmenter.segment(&text).await.is_err());
    }
}
