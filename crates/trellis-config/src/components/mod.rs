//! Per-component configuration sections

pub mod events;
pub mod logging;
pub mod render;

pub use events::{EventsConfig, DEFAULT_DELEGATED_EVENTS};
pub use logging::{LogFormat, LoggingConfig};
pub use render::{ReconcileMode, RenderConfig};
