// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The built-in `TextExtractor`: handles `txt` directly, and returns a
//! `Fatal` error for `pdf`/`epub` so the boundary with the real external
//! Extractor is explicit rather than faked (spec §1, §4.4).

use async_trait::async_trait;
use std::sync::Arc;

use audiobook_pipeline_domain::{BlobStore, BookFormat, DomainError, ExtractedText, TextExtractor};

pub struct TxtTextExtractor {
    blob_store: Arc<dyn BlobStore>,
}

impl TxtTextExtractor {
    pub fn new(blob_store: Arc<dyn BlobStore>) -> Self {
        Self { blob_store }
    }
}

#[async_trait]
impl TextExtractor for TxtTextExtractor {
    fn supports(&self, format: BookFormat) -> bool {
        format == BookFormat::Txt
    }

    async fn extract(&self, source_path: &str, format: BookFormat) -> Result<ExtractedText, DomainError> {
        if format != BookFormat::Txt {
            return Err(DomainError::Fatal(format!(
                "unsupported format for built-in extraction: {format} (external Extractor required)"
            )));
        }
        let bytes = self.blob_store.get(source_path).await?;
        let content = String::from_utf8(bytes).map_err(|e| DomainError::Fatal(format!("source is not valid UTF-8: {e}")))?;
        if content.trim().is_empty() {
            return Err(DomainError::Fatal("extracted text is empty".into()));
        }
        Ok(ExtractedText { content })
    }
}
