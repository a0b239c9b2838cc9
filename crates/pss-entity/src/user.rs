//! User records and the identity resolved from a session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Stored `iat` value meaning "no session has been issued".
pub const NO_SESSION: i64 = 0;

/// A registered account as persisted by the credential store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique login name (6 to 32 characters).
    pub username: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Whether the user holds admin privileges.
    pub admin: bool,
    /// Session counter; only tokens carrying this exact value verify.
    #[serde(skip_serializing)]
    pub iat: i64,
    /// Pending temporary access code, if one was issued.
    #[serde(skip_serializing)]
    pub access_code: Option<String>,
    /// When the access code was issued (milliseconds since epoch).
    #[serde(skip_serializing)]
    pub access_code_issued_at: Option<i64>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Returns `true` if a session is currently active.
    pub fn has_session(&self) -> bool {
        self.iat != NO_SESSION
    }

    /// The pending access code together with its issue time.
    pub fn access_code(&self) -> Option<AccessCode> {
        match (&self.access_code, self.access_code_issued_at) {
            (Some(code), Some(issued_at)) => Some(AccessCode {
                code: code.clone(),
                issued_at,
            }),
            _ => None,
        }
    }

    /// The public projection of this user.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            username: self.username.clone(),
            admin: self.admin,
        }
    }
}

/// Data required to create a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Desired username.
    pub username: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Whether the account starts as an admin.
    pub admin: bool,
}

/// The caller resolved from a verified session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Authenticated username.
    pub username: String,
    /// Admin flag as stored at verification time.
    pub admin: bool,
}

impl Identity {
    /// Returns `true` if this identity is the given user.
    pub fn is(&self, username: &str) -> bool {
        self.username == username
    }
}

/// What listings expose about a user: no hashes, no codes, no counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    /// Username.
    pub username: String,
    /// Admin flag.
    pub admin: bool,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        user.summary()
    }
}

/// A temporary code allowing a password reset without the old password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessCode {
    /// The code as issued.
    pub code: String,
    /// Issue time in milliseconds since epoch.
    pub issued_at: i64,
}

impl AccessCode {
    /// Case-insensitive comparison against a submitted code.
    pub fn matches(&self, candidate: &str) -> bool {
        self.code.eq_ignore_ascii_case(candidate.trim())
    }

    /// Returns `true` once more than `ttl_ms` has elapsed since issue.
    pub fn is_expired(&self, now_ms: i64, ttl_ms: u64) -> bool {
        now_ms.saturating_sub(self.issued_at) > ttl_ms as i64
    }
}
