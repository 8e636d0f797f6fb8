//! Logging component configuration
//!
//! Consumed by binaries when they install a `tracing` subscriber; the
//! library crates only emit events.

use serde::{Deserialize, Serialize};

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `"info"` or `"trellis_dom=trace"`.
    pub level: String,
    /// Output format of the fmt subscriber.
    pub format: LogFormat,
}

/// Output format of log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    /// Compact single-line output
    #[default]
    #[serde(rename = "text")]
    Text,
    /// Multi-line human oriented output
    #[serde(rename = "pretty")]
    Pretty,
    /// Newline-delimited JSON objects
    #[serde(rename = "json")]
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Text,
        }
    }
}
