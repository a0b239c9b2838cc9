//! Storage root and quota configuration.

use serde::{Deserialize, Serialize};

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// File storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory every user-visible path is confined to.
    #[serde(default = "default_root")]
    pub root: String,
    /// Per-upload size limit in gigabytes.
    #[serde(default = "default_max_upload_gb")]
    pub max_upload_size_gb: f64,
    /// Whether `search` matches names case-sensitively.
    #[serde(default = "default_true")]
    pub search_case_sensitive: bool,
}

impl StorageConfig {
    /// The per-upload limit converted to bytes.
    pub fn max_upload_size_bytes(&self) -> u64 {
        if self.max_upload_size_gb <= 0.0 {
            return 0;
        }
        (self.max_upload_size_gb * BYTES_PER_GB) as u64
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            max_upload_size_gb: default_max_upload_gb(),
            search_case_sensitive: true,
        }
    }
}

fn default_root() -> String {
    "./data/storage".to_string()
}

fn default_max_upload_gb() -> f64 {
    5.0
}

fn default_true() -> bool {
    true
}
