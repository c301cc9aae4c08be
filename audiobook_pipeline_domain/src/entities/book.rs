// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The `Book` entity (spec §3.1).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{BookFormat, BookId, BookState, Percent, UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub owner_id: UserId,
    pub title: String,
    pub format: BookFormat,
    pub state: BookState,
    pub percent_complete: Percent,
    pub total_chunks: Option<u32>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Title length bounds (spec §3.1: "1-255 characters").
pub const TITLE_MIN_LEN: usize = 1;
pub const TITLE_MAX_LEN: usize = 255;

impl Book {
    /// Constructs a new `Book` in the initial `Pending` state, as created by
    /// the Ingest Gateway on `SubmitBook`.
    pub fn new(owner_id: UserId, title: String, format: BookFormat) -> Result<Self, crate::error::DomainError> {
        Self::validate_title(&title)?;
        let now = Utc::now();
        Ok(Self {
            id: BookId::new(),
            owner_id,
            title,
            format,
            state: BookState::Pending,
            percent_complete: Percent::ZERO,
            total_chunks: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn validate_title(title: &str) -> Result<(), crate::error::DomainError> {
        let len = title.chars().count();
        if !(TITLE_MIN_LEN..=TITLE_MAX_LEN).contains(&len) {
            return Err(crate::error::DomainError::Validation(format!(
                "title must be {}-{} characters, got {}",
                TITLE_MIN_LEN, TITLE_MAX_LEN, len
            )));
        }
        Ok(())
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner_id == user
    }

    pub fn is_completed(&self) -> bool {
        self.state == BookState::Completed
    }
}
