// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The `User` entity: the owning principal of zero or more Books. Created by
//! registration, which is external to this core (spec §3.1); never deleted,
//! only soft-deactivated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::UserId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            active: true,
            created_at: Utc::now(),
        }
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_is_active() {
        let user = User::new(UserId::new());
        assert!(user.active);
    }

    #[test]
    fn deactivate_flips_the_flag() {
        let mut user = User::new(UserId::new());
        user.deactivate();
        assert!(!user.active);
    }
}
