//! Server and CORS configuration.

use serde::{Deserialize, Serialize};

/// HTTP listener settings.
///
/// Missing keys fall back to [`ServerConfig::default`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Answer unknown routes with 404 before the session check runs.
    pub predictive_404: bool,
    /// Per-request timeout in seconds; `0` means none, since uploads and
    /// downloads can legitimately run for a long time.
    pub request_timeout_seconds: u64,
    /// Cross-origin policy.
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            predictive_404: false,
            request_timeout_seconds: 0,
            cors: CorsConfig::default(),
        }
    }
}

/// Cross-origin policy. A lone `"*"` entry allows anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<String>,
    pub allowed_headers: Vec<String>,
    /// Preflight cache lifetime.
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: owned(&["*"]),
            allowed_methods: owned(&["GET", "POST", "PUT", "DELETE", "OPTIONS"]),
            allowed_headers: owned(&["*"]),
            max_age_seconds: 3600,
        }
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
