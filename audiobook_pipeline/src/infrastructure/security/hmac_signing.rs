// /////////////////////////////////////////////////////////////////////////////
// Audiobook Pipeline
// Copyright (c) 2025 the Audiobook Pipeline authors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `SigningService` via HMAC-SHA256 (spec §4.7): the token is
//! `base64url(book_id|seq|expiry)` concatenated with `base64url(tag)`,
//! joined by a `.`. Scoping `seq` into the signed payload means a leaked
//! token for one chunk cannot be replayed against any other chunk of the
//! same book.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use ring::hmac;

use audiobook_pipeline_domain::{BookId, DomainError, SignedUrlClaims, SigningService};

pub struct HmacSigningService {
    key: hmac::Key,
}

impl HmacSigningService {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret),
        }
    }

    fn payload(book_id: &BookId, seq: u32, expires_at: DateTime<Utc>) -> String {
        format!("{}|{}|{}", book_id, seq, expires_at.timestamp())
    }
}

impl SigningService for HmacSigningService {
    fn sign(&self, claims: &SignedUrlClaims) -> String {
        let payload = Self::payload(&claims.book_id, claims.seq, claims.expires_at);
        let tag = hmac::sign(&self.key, payload.as_bytes());
        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(payload.as_bytes()),
            URL_SAFE_NO_PAD.encode(tag.as_ref())
        )
    }

    fn verify(&self, token: &str) -> Result<SignedUrlClaims, DomainError> {
        let (payload_b64, tag_b64) = token
            .split_once('.')
            .ok_or_else(|| DomainError::Validation("malformed signed url token".into()))?;

        let payload_bytes = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| DomainError::Validation("malformed signed url token".into()))?;
        let tag_bytes = URL_SAFE_NO_PAD
            .decode(tag_b64)
            .map_err(|_| DomainError::Validation("malformed signed url token".into()))?;

        // Constant-time comparison (spec §4.7 "(a) tag equality in constant
        // time"): `ring::hmac::verify` recomputes the tag and compares it
        // without early-exit branching on byte position.
        hmac::verify(&self.key, &payload_bytes, &tag_bytes).map_err(|_| DomainError::Unauthenticated("invalid signature".into()))?;

        let payload = String::from_utf8(payload_bytes).map_err(|_| DomainError::Validation("malformed signed url token".into()))?;
        let mut parts = payload.splitn(3, '|');
        let book_id_str = parts.next().ok_or_else(|| DomainError::Validation("malformed signed url token".into()))?;
        let seq_str = parts.next().ok_or_else(|| DomainError::Validation("malformed signed url token".into()))?;
        let expires_str = parts.next().ok_or_else(|| DomainError::Validation("malformed signed url token".into()))?;

        let book_id = BookId::from_string(book_id_str)?;
        let seq: u32 = seq_str.parse().map_err(|_| DomainError::Validation("malformed signed url token".into()))?;
        let expires_secs: i64 = expires_str
            .parse()
            .map_err(|_| DomainError::Validation("malformed signed url token".into()))?;
        let expires_at = Utc
            .timestamp_opt(expires_secs, 0)
            .single()
            .ok_or_else(|| DomainError::Validation("malformed signed url token".into()))?;

        if expires_at <= Utc::now() {
            return Err(DomainError::Unauthenticated("signed url token has expired".into()));
        }

        Ok(SignedUrlClaims { book_id, seq, expires_at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn service() -> HmacSigningService {
        HmacSigningService::new(b"0123456789abcdef0123456789abcdef")
    }

    fn claims(seq: u32, ttl: Duration) -> SignedUrlClaims {
        SignedUrlClaims {
            book_id: BookId::new(),
            seq,
            expires_at: Utc::now() + ttl,
        }
    }

    #[test]
    fn a_freshly_signed_token_verifies() {
        let signer = service();
        let issued = claims(3, Duration::minutes(15));
        let token = signer.sign(&issued);
        let verified = signer.verify(&token).unwrap();
        assert_eq!(verified.book_id, issued.book_id);
        assert_eq!(verified.seq, 3);
    }

    #[test]
    fn an_expired_token_is_rejected() {
        let signer = service();
        let issued = claims(0, Duration::seconds(-1));
        let token = signer.sign(&issued);
        assert!(signer.verify(&token).is_err());
    }

    #[test]
    fn a_tampered_token_fails_verification() {
        let signer = service();
        let issued = claims(0, Duration::minutes(15));
        let mut token = signer.sign(&issued);
        token.push('x');
        assert!(matches!(signer.verify(&token), Err(DomainError::Unauthenticated(_)) | Err(DomainError::Validation(_))));
    }

    #[test]
    fn a_token_signed_with_a_different_secret_fails() {
        let signer_a = HmacSigningService::new(b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        let signer_b = HmacSigningService::new(b"bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
        let issued = claims(0, Duration::minutes(15));
        let token = signer_a.sign(&issued);
        assert!(matches!(signer_b.verify(&token), Err(DomainError::Unauthenticated(_))));
    }

    #[test]
    fn a_token_for_one_chunk_does_not_verify_as_another() {
        let signer = service();
        let issued = claims(1, Duration::minutes(15));
        let token = signer.sign(&issued);
        let verified = signer.verify(&token).unwrap();
        assert_ne!(verified.seq, 2);
    }
}
