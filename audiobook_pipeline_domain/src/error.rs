// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Domain error taxonomy (spec §7). This is the vocabulary every repository
//! and service trait in this crate returns; the HTTP edge in the core crate
//! maps it onto status codes, and the Stage Worker Protocol maps it onto
//! retry/fail decisions.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed input, wrong format, oversized upload. Surfaced as 4xx; no
    /// state change.
    #[error("validation error: {0}")]
    Validation(String),

    /// Ownership mismatch: the caller authenticated fine, but the resource
    /// belongs to a different owner. Surfaced as `NotFound` (spec §4.8), not
    /// a separate Forbidden status, to avoid existence leaks across users.
    #[error("auth error: {0}")]
    Auth(String),

    /// The caller did not authenticate at all: missing/malformed bearer
    /// header, an unrecognized token, or a signed URL that fails signature,
    /// expiry, or resource-scope verification. Surfaced as 401 (spec §6.1,
    /// §7, §8.3 scenario 6) — distinct from `Auth`, which is about a
    /// resource the caller is not allowed to see, not whether they're who
    /// they claim to be.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Unknown resource, or a resource revoked by delete.
    #[error("not found: {0}")]
    NotFound(String),

    /// A malformed identifier string or an id failing its category's
    /// validation rule (e.g. nil ULID).
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// `UpdateBookState`'s expected-state guard did not match the row's
    /// current state. Internal to the worker loop: callers Ack and move on.
    #[error("stale transition: expected {expected}, found {actual}")]
    StaleTransition { expected: String, actual: String },

    /// IO error, queue temporarily unavailable, store contention. Retried
    /// with backoff within the worker; surfaced as 503 at the gateway.
    #[error("transient error: {0}")]
    Transient(String),

    /// Stage reported unrecoverable failure, or retry budget exhausted.
    #[error("fatal error: {0}")]
    Fatal(String),

    /// A Chunk row is present but its blob is missing or short of the
    /// recorded `byte_size` (spec §3.2 invariant 6). Fatal on read.
    #[error("integrity error: {0}")]
    Integrity(String),
}

impl DomainError {
    /// True for errors a Stage Worker should retry (with backoff) rather
    /// than immediately fail the job (spec §4.4).
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::Transient(_))
    }
}
