//! Event delegation configuration

use serde::{Deserialize, Serialize};

/// Event types that get a capturing listener on the document by default.
pub const DEFAULT_DELEGATED_EVENTS: &[&str] = &[
    "click",
    "dblclick",
    "keydown",
    "keyup",
    "input",
    "change",
    "blur",
    "focus",
    "submit",
    "mouseenter",
    "mouseleave",
    "mousedown",
    "mouseup",
];

/// Event delegation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Event types dispatched through the delegated document listener.
    ///
    /// Handlers registered for any other type are stored but never fire.
    pub delegated: Vec<String>,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            delegated: DEFAULT_DELEGATED_EVENTS
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

impl EventsConfig {
    /// Returns the first entry that is not a valid DOM event type name.
    ///
    /// Event types are matched case-sensitively by the browser, and the
    /// standard ones are all lowercase ASCII.
    pub fn invalid_entry(&self) -> Option<&str> {
        self.delegated
            .iter()
            .map(String::as_str)
            .find(|t| t.is_empty() || !t.chars().all(|c| c.is_ascii_lowercase() || c == '-'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_covers_the_common_ui_events() {
        let config = EventsConfig::default();
        assert_eq!(config.delegated.len(), 13);
        assert!(config.delegated.iter().any(|t| t == "click"));
        assert!(config.delegated.iter().any(|t| t == "keydown"));
        assert!(config.invalid_entry().is_none());
    }

    #[test]
    fn missing_table_uses_default() {
        let config: EventsConfig = toml::from_str("").unwrap();
        assert_eq!(config, EventsConfig::default());
    }

    #[test]
    fn custom_list_replaces_default() {
        let config: EventsConfig = toml::from_str(r#"delegated = ["click", "touchstart"]"#).unwrap();
        assert_eq!(config.delegated, vec!["click", "touchstart"]);
    }

    #[test]
    fn flags_uppercase_entry() {
        let config = EventsConfig {
            delegated: vec!["click".into(), "onClick".into()],
        };
        assert_eq!(config.invalid_entry(), Some("onClick"));
    }
}
