//! Claims carried by every session token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account the token was issued to.
    pub username: String,
    /// Session counter value at issue time (milliseconds since epoch,
    /// bumped past the previous value when needed). Must equal the stored
    /// counter for the token to verify.
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}
