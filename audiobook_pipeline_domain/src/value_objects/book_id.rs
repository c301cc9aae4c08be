// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Book identifier value object.
//!
//! A `BookId` is a time-ordered ULID: sorting books by id recovers creation
//! order, which the Metadata Store relies on for `ListBooksForOwner`'s
//! `created_at desc` default without needing a separate index.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use ulid::Ulid;

use super::generic_id::{GenericId, IdCategory};
use crate::error::DomainError;

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct BookId(GenericId<BookMarker>);

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
struct BookMarker;

impl IdCategory for BookMarker {
    fn category_name() -> &'static str {
        "book"
    }

    fn validate_id(ulid: &Ulid) -> Result<(), DomainError> {
        if *ulid == Ulid::nil() {
            return Err(DomainError::InvalidIdentifier("book id cannot be nil".into()));
        }
        Ok(())
    }
}

impl BookId {
    pub fn new() -> Self {
        Self(GenericId::new())
    }

    pub fn from_ulid(ulid: Ulid) -> Result<Self, DomainError> {
        Ok(Self(GenericId::from_ulid(ulid)?))
    }

    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        Ok(Self(GenericId::from_string(s)?))
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0.as_ulid()
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.0.timestamp_ms()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.0.validate()
    }

    #[cfg(test)]
    pub fn nil() -> Self {
        Self(GenericId::nil())
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for BookId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl From<Ulid> for BookId {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid).unwrap_or_else(|_| Self::new())
    }
}

impl From<BookId> for Ulid {
    fn from(id: BookId) -> Self {
        id.as_ulid()
    }
}
