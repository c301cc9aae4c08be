// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `percent_complete` as a clamped 0..=100 value, enforcing the "monotonic
//! non-decreasing during a successful run" invariant (spec §3.1 invariant 4)
//! at construction sites rather than trusting every caller to clamp by hand.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Percent(u8);

impl Percent {
    pub const ZERO: Percent = Percent(0);
    pub const COMPLETE: Percent = Percent(100);

    pub fn new(value: u8) -> Result<Self, crate::error::DomainError> {
        if value > 100 {
            return Err(crate::error::DomainError::Validation(format!(
                "percent_complete must be 0..=100, got {}",
                value
            )));
        }
        Ok(Percent(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<u8> for Percent {
    type Error = crate::error::DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Percent::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_values_above_100() {
        assert!(Percent::new(101).is_err());
        assert!(Percent::new(255).is_err());
    }

    #[test]
    fn accepts_boundary_values() {
        assert!(Percent::new(0).is_ok());
        assert!(Percent::new(100).is_ok());
    }
}
