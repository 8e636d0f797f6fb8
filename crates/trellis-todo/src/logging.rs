//! Subscriber setup for the binary

use crate::cli::LogLevel;
use trellis_config::{LogFormat, LoggingConfig};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// `EnvFilter` directive: the command-line level wins over the file.
pub fn filter_directive(config: &LoggingConfig, cli_level: Option<LogLevel>) -> String {
    match cli_level {
        Some(level) => LevelFilter::from(level).to_string().to_lowercase(),
        None => config.level.clone(),
    }
}

/// Install the global fmt subscriber. Output goes to stderr so the
/// rendered HTML on stdout stays clean.
pub fn init(config: &LoggingConfig, cli_level: Option<LogLevel>) {
    let filter = EnvFilter::new(filter_directive(config, cli_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.format {
        LogFormat::Text => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}
