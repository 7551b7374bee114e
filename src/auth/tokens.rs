//! Bearer token verification and issuance
//!
//! Tokens are HS256-signed JWTs carrying a `username` claim. The verifier
//! pins the algorithm, so a token whose header declares anything else
//! (including `none`) is rejected before its claims are looked at.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Optional prefix clients may put in front of the token
pub const BEARER_PREFIX: &str = "Bearer ";

/// The only algorithm tokens may be signed with
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is empty")]
    Empty,

    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("token carries no username claim")]
    MissingIdentity,

    #[error("failed to sign token: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),
}

/// The verified caller, taken from the token's `username` claim
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(String);

impl Identity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Deserialize)]
struct IdentityClaims {
    #[serde(default)]
    username: Option<String>,
    // Typed so a non-numeric time claim fails decoding instead of being skipped
    #[serde(default)]
    #[allow(dead_code)]
    exp: Option<u64>,
    #[serde(default)]
    #[allow(dead_code)]
    nbf: Option<u64>,
}

#[derive(Debug, Serialize)]
struct IssuedClaims<'a> {
    username: &'a str,
    iat: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
}

/// Validates bearer tokens against the shared secret
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        // `exp` and `nbf` are enforced when present but not required, with no grace period
        validation.required_spec_claims.clear();
        validation.validate_nbf = true;
        validation.leeway = 0;
        validation.validate_aud = false;

        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Verify a raw credential, returning the caller's identity if and only if
    /// the signature, algorithm, expiry and `username` claim all check out.
    pub fn verify(&self, raw: &str) -> Option<Identity> {
        self.check(raw).ok()
    }

    /// Like [`verify`](Self::verify) but keeps the rejection reason
    pub fn check(&self, raw: &str) -> Result<Identity, TokenError> {
        if raw.is_empty() {
            return Err(TokenError::Empty);
        }

        let token = raw.strip_prefix(BEARER_PREFIX).unwrap_or(raw);

        let data = decode::<IdentityClaims>(token, &self.key, &self.validation)
            .map_err(TokenError::Invalid)?;

        match data.claims.username {
            Some(username) if !username.is_empty() => Ok(Identity(username)),
            _ => Err(TokenError::MissingIdentity),
        }
    }
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenVerifier([REDACTED])")
    }
}

/// Mints tokens the verifier accepts (operator tooling and tests)
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
}

impl TokenIssuer {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            key: EncodingKey::from_secret(secret),
        }
    }

    /// Issue a token for `username`, expiring after `ttl` if given
    pub fn issue(&self, username: &str, ttl: Option<Duration>) -> Result<String, TokenError> {
        if username.is_empty() {
            return Err(TokenError::MissingIdentity);
        }

        let now = Utc::now().timestamp();
        let claims = IssuedClaims {
            username,
            iat: now,
            exp: ttl.map(|ttl| now.saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX))),
        };

        encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.key).map_err(TokenError::Sign)
    }
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenIssuer([REDACTED])")
    }
}
