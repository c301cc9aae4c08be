// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Signed streaming URL contract (spec §4.7). The Streaming Gateway hands
//! clients a time-limited, tamper-evident token instead of a raw blob path,
//! so a leaked URL cannot be replayed past its expiry or reused for a
//! different book. The HMAC mechanics live in the core crate
//! (`ring::hmac`); this crate only pins the claims shape and the contract.

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::value_objects::BookId;

/// What a signed URL actually authorizes: "this one chunk, until this time"
/// (spec §4.7: resource fields must match the requested `(book_id, seq)`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrlClaims {
    pub book_id: BookId,
    pub seq: u32,
    pub expires_at: DateTime<Utc>,
}

pub trait SigningService: Send + Sync {
    /// Produces an opaque, URL-safe token encoding `claims` plus a MAC.
    fn sign(&self, claims: &SignedUrlClaims) -> String;

    /// Verifies the MAC and expiry, returning the claims on success.
    /// `DomainError::Unauthenticated` on a bad signature or an expired
    /// token, `DomainError::Validation` on a structurally malformed one.
    fn verify(&self, token: &str) -> Result<SignedUrlClaims, DomainError>;
}
