// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! A config-seeded `TokenResolver` (spec §4.8, §9 open question 1): token
//! issuance is explicitly out of scope, so this stands in for whatever
//! external identity provider actually mints bearer tokens. Each entry maps
//! one opaque token string to the `UserId` that owns it, loaded once at
//! startup from `AppConfig`.

use async_trait::async_trait;
use std::collections::HashMap;

use audiobook_pipeline_domain::{DomainError, TokenResolver, UserId};

pub struct StaticTokenResolver {
    tokens: HashMap<String, UserId>,
}

impl StaticTokenResolver {
    pub fn new(tokens: HashMap<String, UserId>) -> Self {
        Self { tokens }
    }

    /// Parses `"<token>=<user_ulid>,<token>=<user_ulid>,..."` as produced by
    /// the `AUDIOBOOK__AUTH_TOKENS` configuration key.
    pub fn from_config_str(raw: &str) -> Result<Self, DomainError> {
        let mut tokens = HashMap::new();
        for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (token, user_id) = entry
                .split_once('=')
                .ok_or_else(|| DomainError::Validation(format!("malformed auth token entry: {entry}")))?;
            tokens.insert(token.to_string(), UserId::from_string(user_id)?);
        }
        Ok(Self::new(tokens))
    }
}

#[async_trait]
impl TokenResolver for StaticTokenResolver {
    async fn resolve(&self, bearer_token: &str) -> Result<UserId, DomainError> {
        self.tokens
            .get(bearer_token)
            .cloned()
            .ok_or_else(|| DomainError::Unauthenticated("unrecognized bearer token".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_a_known_token() {
        let user = UserId::new();
        let mut tokens = HashMap::new();
        tokens.insert("secret-token".to_string(), user.clone());
        let resolver = StaticTokenResolver::new(tokens);

        assert_eq!(resolver.resolve("secret-token").await.unwrap(), user);
    }

    #[tokio::test]
    async fn rejects_an_unknown_token() {
        let resolver = StaticTokenResolver::new(HashMap::new());
        assert!(matches!(resolver.resolve("nope").await, Err(DomainError::Unauthenticated(_))));
    }

    #[test]
    fn parses_from_config_string() {
        let user = UserId::new();
        let raw = format!("tok1={}", user);
        let resolver = StaticTokenResolver::from_config_str(&raw).unwrap();
        assert_eq!(resolver.tokens.get("tok1"), Some(&user));
    }

    #[test]
    fn rejects_a_malformed_config_entry() {
        assert!(StaticTokenResolver::from_config_str("not-a-pair").is_err());
    }
}
