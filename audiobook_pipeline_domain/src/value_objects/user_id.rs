// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! User (owner) identifier value object. Same ULID-newtype shape as
//! [`super::book_id::BookId`]; kept as a distinct type so a `UserId` can
//! never be passed where a `BookId` is expected, and vice versa.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use ulid::Ulid;

use super::generic_id::{GenericId, IdCategory};
use crate::error::DomainError;

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct UserId(GenericId<UserMarker>);

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
struct UserMarker;

impl IdCategory for UserMarker {
    fn category_name() -> &'static str {
        "user"
    }

    fn validate_id(ulid: &Ulid) -> Result<(), DomainError> {
        if *ulid == Ulid::nil() {
            return Err(DomainError::InvalidIdentifier("user id cannot be nil".into()));
        }
        Ok(())
    }
}

impl UserId {
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

    pub fn validate(&self) -> Result<(), DomainError> {
        self.0.validate()
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl From<Ulid> for UserId {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid).unwrap_or_else(|_| Self::new())
    }
}
