// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Domain layer for the audiobook pipeline coordination service.
//!
//! This crate holds the pure, reusable business logic: value objects,
//! entities, the error taxonomy, and the repository/service contracts
//! every other crate programs against. It has no knowledge of SQLite,
//! HTTP, or any particular queue or blob implementation — those are
//! infrastructure choices that live one layer up, in the core crate.

pub mod entities;
pub mod error;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use entities::{is_contiguous, Book, Chunk, User, TARGET_CHUNK_DURATION_S, TITLE_MAX_LEN, TITLE_MIN_LEN};
pub use error::DomainError;
pub use repositories::{
    backoff_delay, BlobStat, BlobStore, ByteChunk, Job, MetadataStore, Paging, QueueBroker, Receipt, UpdateOutcome,
};
pub use services::{
    ExtractedText, FailureClass, Packager, Segmenter, SignedUrlClaims, SigningService, StageError, StageHandler,
    Synthesizer, SynthesizedAudio, TextExtractor, TextSegment, TokenResolver,
};
pub use value_objects::{BookFormat, BookId, BookState, Percent, Stage, UserId, ALL_STATES};
