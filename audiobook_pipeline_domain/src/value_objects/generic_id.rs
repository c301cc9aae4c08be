// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Generic ULID-backed identifier newtype shared by every entity id in this
//! crate. Each entity defines a zero-sized marker type implementing
//! [`IdCategory`] and wraps `GenericId<Marker>` so that, for example,
//! `BookId` and `UserId` cannot be confused at compile time even though both
//! are "just a ULID" underneath.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::marker::PhantomData;
use ulid::Ulid;

use crate::error::DomainError;

/// Per-entity validation and naming hook for [`GenericId`].
pub trait IdCategory {
    /// Human-readable category name, used in error messages (e.g. "book").
    fn category_name() -> &'static str;

    /// Entity-specific validation beyond "is a well-formed ULID".
    fn validate_id(ulid: &Ulid) -> Result<(), DomainError>;
}

/// A type-tagged ULID.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenericId<Marker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<Marker>,
}

impl<Marker: IdCategory> GenericId<Marker> {
    /// Generates a new id with the current timestamp.
    pub fn new() -> Self {
        Self {
            ulid: Ulid::new(),
            _marker: PhantomData,
        }
    }

    pub fn from_ulid(ulid: Ulid) -> Result<Self, DomainError> {
        Marker::validate_id(&ulid)?;
        Ok(Self {
            ulid,
            _marker: PhantomData,
        })
    }

    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        let ulid = Ulid::from_string(s).map_err(|e| {
            DomainError::InvalidIdentifier(format!("{}: {}", Marker::category_name(), e))
        })?;
        Self::from_ulid(ulid)
    }

    /// Creates an id with a specific timestamp and a random tail; useful for
    /// building range-query boundaries.
    pub fn from_timestamp_ms(timestamp_ms: u64) -> Result<Self, DomainError> {
        let ulid = Ulid::from_parts(timestamp_ms, rand::random::<u64>() as u128);
        Self::from_ulid(ulid)
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.ulid.timestamp_ms()
    }

    pub fn datetime(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::from_timestamp_millis(self.timestamp_ms() as i64).unwrap_or_default()
    }

    pub fn to_lowercase(&self) -> String {
        self.ulid.to_string().to_lowercase()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        Marker::validate_id(&self.ulid)
    }

    pub fn is_nil(&self) -> bool {
        self.ulid == Ulid::nil()
    }

    #[cfg(test)]
    pub fn nil() -> Self {
        Self {
            ulid: Ulid::nil(),
            _marker: PhantomData,
        }
    }
}

impl<Marker: IdCategory> Default for GenericId<Marker> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Marker> Display for GenericId<Marker> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ulid)
    }
}

impl<Marker> AsRef<Ulid> for GenericId<Marker> {
    fn as_ref(&self) -> &Ulid {
        &self.ulid
    }
}
