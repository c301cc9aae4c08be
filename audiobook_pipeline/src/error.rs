// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Core-crate error type: wraps `DomainError` plus the infrastructure-level
//! failures (sqlx, IO) that never cross into the domain layer, and maps
//! both onto HTTP status codes at the gateway edge (spec §7).

use audiobook_pipeline_domain::DomainError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("multipart error: {0}")]
    Multipart(String),

    #[error("file too large: {0}")]
    PayloadTooLarge(String),

    #[error("book is not yet completed: {0}")]
    NotCompleted(String),

    #[error("requested range is not satisfiable: {0}")]
    RangeNotSatisfiable(String),
}

impl CoreError {
    /// Machine-readable error code for the HTTP response body (spec §6.1,
    /// §8.3 scenarios 2/3 assert on these).
    fn code(&self) -> &'static str {
        match self {
            CoreError::Domain(DomainError::Validation(_)) => "validation_error",
            CoreError::Domain(DomainError::Auth(_)) | CoreError::Domain(DomainError::NotFound(_)) => "not_found",
            CoreError::Domain(DomainError::Unauthenticated(_)) => "unauthenticated",
            CoreError::Domain(DomainError::InvalidIdentifier(_)) => "validation_error",
            CoreError::Domain(DomainError::StaleTransition { .. }) => "conflict",
            CoreError::Domain(DomainError::Transient(_)) => "service_unavailable",
            CoreError::Domain(DomainError::Fatal(_)) => "processing_failed",
            CoreError::Domain(DomainError::Integrity(_)) => "not_found",
            CoreError::Database(_) | CoreError::Io(_) => "service_unavailable",
            CoreError::Multipart(_) => "validation_error",
            CoreError::PayloadTooLarge(_) => "file_too_large",
            CoreError::NotCompleted(_) => "not_completed",
            CoreError::RangeNotSatisfiable(_) => "range_not_satisfiable",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            CoreError::Domain(DomainError::Validation(_)) => StatusCode::BAD_REQUEST,
            // Auth and NotFound are deliberately indistinguishable to the
            // caller (spec §4.8, §7): both surface as 404.
            CoreError::Domain(DomainError::Auth(_)) | CoreError::Domain(DomainError::NotFound(_)) => StatusCode::NOT_FOUND,
            // Unlike ownership mismatches, failing to authenticate at all
            // carries no existence-leak risk, so it gets its own code
            // (spec §6.1, §8.3 scenario 6).
            CoreError::Domain(DomainError::Unauthenticated(_)) => StatusCode::UNAUTHORIZED,
            CoreError::Domain(DomainError::InvalidIdentifier(_)) => StatusCode::BAD_REQUEST,
            CoreError::Domain(DomainError::StaleTransition { .. }) => StatusCode::CONFLICT,
            CoreError::Domain(DomainError::Transient(_)) => StatusCode::SERVICE_UNAVAILABLE,
            CoreError::Domain(DomainError::Fatal(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            CoreError::Domain(DomainError::Integrity(_)) => StatusCode::NOT_FOUND,
            CoreError::Database(_) | CoreError::Io(_) => StatusCode::SERVICE_UNAVAILABLE,
            CoreError::Multipart(_) => StatusCode::BAD_REQUEST,
            CoreError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            CoreError::NotCompleted(_) => StatusCode::CONFLICT,
            CoreError::RangeNotSatisfiable(_) => StatusCode::RANGE_NOT_SATISFIABLE,
        }
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Ownership mismatches collapse to the same body as a genuinely
        // unknown book (spec §4.8): no detail that would leak existence.
        let message = match &self {
            CoreError::Domain(DomainError::Auth(_)) => "not found".to_string(),
            other => other.to_string(),
        };
        (status, Json(json!({ "error": self.code(), "message": message }))).into_response()
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
