//! Session token creation.

use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};

use pss_core::config::AuthConfig;
use pss_core::error::AppError;

use super::claims::Claims;

/// Creates HS256-signed session tokens.
#[derive(Clone)]
pub struct TokenEncoder {
    encoding_key: EncodingKey,
    ttl_minutes: i64,
}

impl std::fmt::Debug for TokenEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenEncoder")
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

impl TokenEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.token_secret.as_bytes()),
            ttl_minutes: config.token_ttl_minutes as i64,
        }
    }

    /// Signs a token for `username` carrying the session counter `iat`.
    pub fn issue(&self, username: &str, iat: i64) -> Result<String, AppError> {
        let exp = Utc::now() + chrono::Duration::minutes(self.ttl_minutes);
        let claims = Claims {
            username: username.to_string(),
            iat,
            exp: exp.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode session token: {e}")))
    }
}
