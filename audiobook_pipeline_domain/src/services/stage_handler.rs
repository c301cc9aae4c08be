// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The Stage Worker Protocol's per-stage hook (spec §4.4). A `StageRunner`
//! (core crate) drives the 9-step reserve/guard/work/advance loop that is
//! identical across stages; only step 5 — "perform the stage's
//! externally-defined work" — differs, and that is exactly what
//! `StageHandler` isolates.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::value_objects::BookId;

/// Classification a `StageHandler` attaches to a failure so the runner knows
/// whether to retry or fail the job outright (spec §4.4 "on any
/// stage-internal error").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    Transient,
    Fatal,
}

#[derive(Debug, Clone)]
pub struct StageError {
    pub class: FailureClass,
    pub message: String,
}

impl StageError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            class: FailureClass::Transient,
            message: message.into(),
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            class: FailureClass::Fatal,
            message: message.into(),
        }
    }
}

impl From<DomainError> for StageError {
    fn from(err: DomainError) -> Self {
        if err.is_retryable() {
            StageError::transient(err.to_string())
        } else {
            StageError::fatal(err.to_string())
        }
    }
}

impl std::fmt::Display for StageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Step 5 of the worker loop: load inputs, do the stage's work, write
/// outputs, and record any stage-specific metadata rows (e.g. Package calls
/// `upsert_chunk`/`set_total_chunks`). Implementations receive the book id
/// and are responsible for reading/writing through the `BlobStore` and
/// `MetadataStore` they were constructed with; the runner only needs the
/// pass/fail outcome.
#[async_trait]
pub trait StageHandler: Send + Sync {
    /// Human-readable name for logging/metrics (e.g. "extract").
    fn name(&self) -> &'static str;

    async fn run(&self, book_id: &BookId) -> Result<(), StageError>;
}
