//! Signed, self-contained email confirmation tokens.
//!
//! A token is an HS256 JWT carrying the user id and issuance time. Nothing
//! is stored server-side: the signature and the age check are the only
//! validity criteria, so rotating the secret invalidates every outstanding
//! token.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Marks a token as a confirmation token, so other JWTs signed with the
/// same secret are rejected.
const CONFIRM_PURPOSE: &str = "confirm";

/// Why a token was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed or badly signed token: {0}")]
    Malformed(String),

    #[error("token is not a confirmation token")]
    WrongPurpose,

    #[error("token expired")]
    Expired,

    #[error("token encode: {0}")]
    Encode(String),
}

/// Claims embedded in a confirmation token.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfirmationClaims {
    /// Subject — user id.
    sub: String,
    purpose: String,
    /// Issued at (unix timestamp).
    iat: i64,
    /// Informational expiry; the age check against the configured TTL is
    /// what actually decides.
    exp: i64,
}

/// Issues and verifies confirmation tokens.
pub struct ConfirmationTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl ConfirmationTokens {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `user_id`, stamped with the current time.
    pub fn issue(&self, user_id: &str) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if it were `issued_at` now.
    pub fn issue_at(&self, user_id: &str, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = ConfirmationClaims {
            sub: user_id.to_string(),
            purpose: CONFIRM_PURPOSE.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    /// Verify a token against the current time, returning the user id.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token at `now`.
    ///
    /// A token whose age equals the TTL exactly is still valid; one second
    /// more and it is expired.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub", "iat"]);

        let claims = decode::<ConfirmationClaims>(token, &self.decoding, &validation)
            .map_err(|e| TokenError::Malformed(e.to_string()))?
            .claims;

        if claims.purpose != CONFIRM_PURPOSE {
            return Err(TokenError::WrongPurpose);
        }
        if now.timestamp() - claims.iat > self.ttl.num_seconds() {
            return Err(TokenError::Expired);
        }
        Ok(claims.sub)
    }
}

/// Resolve the signing secret: env var `STUDIO_SECRET_KEY` → `SECRET_KEY` → persisted file.
pub fn resolve_signing_secret() -> String {
    for var in ["STUDIO_SECRET_KEY", "SECRET_KEY"] {
        if let Ok(secret) = std::env::var(var)
            && !secret.is_empty()
        {
            return secret;
        }
    }
    // Generate and persist
    let secret_path = signing_secret_path();
    if let Ok(existing) = std::fs::read_to_string(&secret_path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    match persist_secret(&secret_path, &secret) {
        Ok(()) => info!(path = %secret_path.display(), "generated new signing secret"),
        Err(e) => warn!(
            path = %secret_path.display(),
            "generated signing secret could not be saved, confirmation links will not survive a restart: {e}"
        ),
    }
    secret
}

fn persist_secret(path: &Path, secret: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, secret)
}

/// Path to the persisted signing secret file.
fn signing_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("studio")
        .join("secret-key")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persist_secret_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studio").join("secret-key");
        persist_secret(&path, "abc").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "abc");
    }

    #[test]
    fn persist_secret_reports_unwritable_location() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        assert!(persist_secret(&blocker.join("secret-key"), "abc").is_err());
    }

    fn tokens() -> ConfirmationTokens {
        ConfirmationTokens::new(b"test-secret", Duration::hours(1))
    }

    #[test]
    fn verify_returns_the_issued_identity() {
        let svc = tokens();
        let token = svc.issue("user-1").unwrap();
        assert_eq!(svc.verify(&token).unwrap(), "user-1");
    }

    #[test]
    fn age_equal_to_ttl_passes_and_one_second_more_fails() {
        let svc = tokens();
        let issued = Utc::now();
        let token = svc.issue_at("user-1", issued).unwrap();

        let at_boundary = issued + Duration::hours(1);
        assert_eq!(svc.verify_at(&token, at_boundary).unwrap(), "user-1");

        let past_boundary = at_boundary + Duration::seconds(1);
        assert_eq!(
            svc.verify_at(&token, past_boundary),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let other = ConfirmationTokens::new(b"other-secret", Duration::hours(1));
        let token = other.issue("user-1").unwrap();
        assert!(matches!(
            tokens().verify(&token),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn garbage_and_tampered_tokens_are_rejected() {
        let svc = tokens();
        assert!(matches!(svc.verify("abc"), Err(TokenError::Malformed(_))));

        let mut token = svc.issue("user-1").unwrap();
        token.push('x');
        assert!(matches!(svc.verify(&token), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn jwt_with_other_purpose_is_rejected() {
        let claims = ConfirmationClaims {
            sub: "user-1".into(),
            purpose: "session".into(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert_eq!(tokens().verify(&token), Err(TokenError::WrongPurpose));
    }
}
