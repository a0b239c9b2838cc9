//! HTTP Basic credentials for the login endpoint.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use pss_core::error::AppError;

use crate::error::ApiError;

/// Username and password from an `Authorization: Basic` header.
#[derive(Clone)]
pub struct BasicCredentials {
    /// Username
    pub username: String,
    /// Password (plaintext from header)
    pub password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl BasicCredentials {
    /// Parses the value of an `Authorization` header.
    pub fn parse(header: &str) -> Option<Self> {
        let encoded = header.strip_prefix("Basic ")?;
        let decoded = BASE64.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (username, password) = decoded.split_once(':')?;

        Some(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

impl<S: Send + Sync> FromRequestParts<S> for BasicCredentials {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing Basic authorization header"))?;

        Self::parse(header)
            .ok_or_else(|| AppError::authentication("Malformed Basic authorization header").into())
    }
}
