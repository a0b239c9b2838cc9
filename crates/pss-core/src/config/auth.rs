//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Secret shipped as the default; the server warns when it is still in use.
pub const DEFAULT_TOKEN_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

/// Token and access-code configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for token signing (HMAC-SHA256).
    #[serde(default = "default_token_secret")]
    pub token_secret: String,
    /// Session token lifetime in minutes.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: u64,
    /// Clock-skew allowance when checking token expiry.
    #[serde(default = "default_leeway")]
    pub token_leeway_seconds: u64,
    /// How long a temporary access code stays redeemable, in milliseconds.
    #[serde(default = "default_access_code_expiration")]
    pub access_code_expiration_ms: u64,
    /// Number of characters in a generated access code.
    #[serde(default = "default_access_code_length")]
    pub access_code_length: usize,
}

impl AuthConfig {
    /// Returns `true` when the shipped placeholder secret is still configured.
    pub fn uses_default_secret(&self) -> bool {
        self.token_secret == DEFAULT_TOKEN_SECRET
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: default_token_secret(),
            token_ttl_minutes: default_token_ttl(),
            token_leeway_seconds: default_leeway(),
            access_code_expiration_ms: default_access_code_expiration(),
            access_code_length: default_access_code_length(),
        }
    }
}

fn default_token_secret() -> String {
    DEFAULT_TOKEN_SECRET.to_string()
}

fn default_token_ttl() -> u64 {
    24 * 60
}

fn default_leeway() -> u64 {
    5
}

fn default_access_code_expiration() -> u64 {
    15 * 60 * 1000
}

fn default_access_code_length() -> usize {
    6
}
