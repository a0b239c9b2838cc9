//! Response DTOs.

use serde::{Deserialize, Serialize};

/// Returned by login and renew.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Session token to pass as `?token=`.
    pub token: String,
}

/// Plain confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable message.
    pub message: String,
}

impl MessageResponse {
    /// Builds a message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A freshly issued access code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessCodeResponse {
    /// The code; shown once.
    pub code: String,
}

/// Free-space report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceResponse {
    /// Volume size in bytes.
    pub total: u64,
    /// Available bytes.
    pub free: u64,
}

/// Liveness probe body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `true` while the process serves requests.
    pub running: bool,
}
