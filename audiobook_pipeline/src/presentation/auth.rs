// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Bearer-token extraction (spec §4.8). An axum `FromRequestParts` impl so
//! every handler that needs the caller's identity just adds `AuthUser` to
//! its argument list instead of hand-parsing the `Authorization` header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use audiobook_pipeline_domain::{DomainError, UserId};

use crate::error::CoreError;
use crate::presentation::state::AppState;

pub struct AuthUser(pub UserId);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = CoreError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| DomainError::Unauthenticated("missing Authorization header".into()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| DomainError::Unauthenticated("Authorization header must be a Bearer token".into()))?;

        let owner = state.token_resolver.resolve(token).await?;
        Ok(AuthUser(owner))
    }
}
