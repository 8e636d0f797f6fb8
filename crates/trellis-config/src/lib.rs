//! # Trellis Configuration Library
//!
//! Typed configuration for the Trellis virtual-DOM framework and the
//! applications built on it.
//!
//! ## Features
//!
//! - TOML configuration with defaults for every field
//! - Render behaviour (child reconciliation strategy)
//! - Event delegation (which event types get a document-level listener)
//! - Logging level and output format for binaries
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use trellis_config::ConfigLoader;
//!
//! let config = ConfigLoader::load_from_file("trellis.toml")?;
//! println!("reconcile mode: {:?}", config.render.reconcile);
//! # Ok::<(), trellis_config::ConfigError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod components;
mod config;
mod loader;

// Include test_utils when test-utils feature is enabled
#[cfg(feature = "test-utils")]
mod test_utils;

pub use components::*;
pub use config::*;
pub use loader::*;

// Export test utilities when feature is enabled
#[cfg(feature = "test-utils")]
pub use test_utils::*;
