//! Configuration loading

use crate::config::TrellisConfig;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors raised while reading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Failed to read config at {path}: {source}")]
    Io {
        /// Path that was being read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid TOML for [`TrellisConfig`]
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field parsed but holds an unusable value
    #[error("Invalid value for {field}: {value:?}")]
    InvalidValue {
        /// Dotted path of the field
        field: String,
        /// Offending value
        value: String,
    },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Loads [`TrellisConfig`] from TOML sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Parse and validate a TOML document.
    pub fn parse(contents: &str) -> ConfigResult<TrellisConfig> {
        let config: TrellisConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<TrellisConfig> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config file");
        Self::parse(&contents)
    }

    /// Load from `path` when one is given, otherwise use defaults.
    ///
    /// An explicitly named file that does not exist is an error.
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<TrellisConfig> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => {
                debug!("no config file given, using defaults");
                Ok(TrellisConfig::default())
            }
        }
    }
}
