//! Session token signature and expiry validation.
//!
//! A token that decodes here is not yet valid: the caller must still
//! compare its `iat` against the stored session counter.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use pss_core::config::AuthConfig;
use pss_core::error::AppError;

use super::claims::Claims;

/// Validates session token signatures and expiry.
#[derive(Clone)]
pub struct TokenDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.token_leeway_seconds;

        Self {
            decoding_key: DecodingKey::from_secret(config.token_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes a token, checking signature and expiry.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::authentication("Token has expired")
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::authentication("Invalid token signature")
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::Base64(_)
                | jsonwebtoken::errors::ErrorKind::Json(_)
                | jsonwebtoken::errors::ErrorKind::Utf8(_) => {
                    AppError::authentication("Invalid token format")
                }
                _ => AppError::authentication(format!("Token validation failed: {e}")),
            }
        })?;

        Ok(data.claims)
    }
}
