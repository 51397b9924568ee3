//! Bearer sessions backing the `Authorization` header.
//!
//! A session embeds the identity and role claims at issue time. Users are
//! immutable after registration, so the role snapshot cannot go stale.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};

use super::user::{Role, UserId};

/// Opaque bearer token returned to the client at registration and login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap an encoded token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Token text for the response body.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<SessionToken> for String {
    fn from(value: SessionToken) -> Self {
        value.0
    }
}

/// SHA-256 fingerprint of a bearer token; the only form ever persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenDigest(String);

impl TokenDigest {
    /// Fingerprint the presented token text.
    pub fn of(token: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Wrap an already-encoded fingerprint, e.g. loaded from storage.
    pub fn from_encoded(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    /// Hex fingerprint text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TokenDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted session: token fingerprint plus embedded identity claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token_digest: TokenDigest,
    user_id: UserId,
    role: Role,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Session {
    /// Assemble a session from stored components.
    pub const fn new(
        token_digest: TokenDigest,
        user_id: UserId,
        role: Role,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            token_digest,
            user_id,
            role,
            issued_at,
            expires_at,
        }
    }

    /// Issue a session for the given identity, valid for `ttl` from `now`.
    pub fn issue(
        token_digest: TokenDigest,
        user_id: UserId,
        role: Role,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self::new(token_digest, user_id, role, now, now + ttl)
    }

    /// Fingerprint of the bearer token this session belongs to.
    pub const fn token_digest(&self) -> &TokenDigest {
        &self.token_digest
    }

    /// Identity claim.
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Role claim captured at issue time.
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Issue timestamp.
    pub const fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Expiry timestamp.
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the session has expired as of `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
