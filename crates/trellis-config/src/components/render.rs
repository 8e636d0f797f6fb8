//! Render component configuration

use serde::{Deserialize, Serialize};

/// How the diff engine lines up old and new children of an element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileMode {
    /// Index-aligned comparison. Reordered lists are patched slot by slot.
    #[default]
    Positional,
    /// Reuse live nodes by identity key when every child is keyed.
    ///
    /// Falls back to positional comparison for child lists that are not
    /// fully and uniquely keyed.
    Keyed,
}

/// Render configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Child reconciliation strategy used by every render root.
    pub reconcile: ReconcileMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_positional() {
        assert_eq!(RenderConfig::default().reconcile, ReconcileMode::Positional);
    }

    #[test]
    fn parses_lowercase_mode() {
        let config: RenderConfig = toml::from_str(r#"reconcile = "keyed""#).unwrap();
        assert_eq!(config.reconcile, ReconcileMode::Keyed);
    }

    #[test]
    fn rejects_unknown_mode() {
        let result: Result<RenderConfig, _> = toml::from_str(r#"reconcile = "myers""#);
        assert!(result.is_err());
    }
}
