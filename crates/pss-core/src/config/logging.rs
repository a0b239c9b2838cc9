//! Logging configuration.

use serde::{Deserialize, Serialize};

/// Logging and tracing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: `"trace"`, `"debug"`, `"info"`, `"warn"`, `"error"`.
    #[serde(default = "default_level")]
    pub level: String,
    /// Log format: `"json"` or `"pretty"`.
    #[serde(default = "default_format")]
    pub format: String,
    /// Log every request at INFO instead of DEBUG.
    #[serde(default = "default_verbose")]
    pub verbose: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
            verbose: default_verbose(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "pretty".to_string()
}

fn default_verbose() -> bool {
    true
}
