//! Root configuration type

use crate::components::{EventsConfig, LoggingConfig, RenderConfig};
use crate::loader::ConfigError;
use serde::{Deserialize, Serialize};

/// Complete Trellis configuration.
///
/// Every section is optional in the file; missing sections take their
/// defaults, so an empty document is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrellisConfig {
    /// Render behaviour
    pub render: RenderConfig,
    /// Event delegation
    pub events: EventsConfig,
    /// Logging for binaries
    pub logging: LoggingConfig,
}

impl TrellisConfig {
    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(entry) = self.events.invalid_entry() {
            return Err(ConfigError::InvalidValue {
                field: "events.delegated".to_string(),
                value: entry.to_string(),
            });
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                value: self.logging.level.clone(),
            });
        }
        Ok(())
    }
}
