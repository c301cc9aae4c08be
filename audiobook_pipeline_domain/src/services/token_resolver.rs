// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Auth & Ownership contract (spec §4.8). Token issuance is explicitly out
//! of scope (spec's Open Question: the service is a resource server, not
//! an identity provider); `TokenResolver` only turns a bearer token already
//! presented on a request into the `UserId` that owns it, so handlers can
//! enforce per-book ownership checks (`Book::is_owned_by`).

use async_trait::async_trait;

use crate::error::DomainError;
use crate::value_objects::UserId;

#[async_trait]
pub trait TokenResolver: Send + Sync {
    /// Resolves a raw `Authorization: Bearer <token>` value to the caller's
    /// identity. `DomainError::Unauthenticated` if the token is missing,
    /// malformed, or unrecognized.
    async fn resolve(&self, bearer_token: &str) -> Result<UserId, DomainError>;
}
