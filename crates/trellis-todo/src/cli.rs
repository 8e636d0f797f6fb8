use crate::script::Step;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages, one per step
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages, including every diff decision
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "trellis-todo")]
#[command(about = "Script the trellis TodoMVC app and print the resulting HTML")]
#[command(version)]
pub struct Cli {
    /// Set log level (off, error, warn, info, debug, trace)
    /// If not specified, uses config file value
    #[arg(short = 'l', long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file path (defaults are used when omitted)
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Interactions to perform, in order: add:<text>, toggle:<n>,
    /// destroy:<n>, edit:<n>:<text>, toggle-all, clear-completed,
    /// filter:<all|active|completed>
    pub steps: Vec<Step>,
}
