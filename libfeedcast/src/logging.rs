//! Logging setup for the feedcast binary
//!
//! Output goes to stderr in one of three formats. The level comes from
//! `FEEDCAST_LOG_LEVEL`, then `RUST_LOG`, then the publish mode: dry runs are
//! chatty (`debug`), live runs only report errors.

use std::str::FromStr;

use tracing_subscriber::EnvFilter;

use crate::types::PublishMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable text output (no colors, for piping)
    Text,
    /// Machine-parseable JSON (one JSON object per line)
    Json,
    /// Pretty-printed with colors (for development)
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(format!(
                "Invalid log format: '{}'. Valid options: text, json, pretty",
                s
            )),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
            LogFormat::Pretty => write!(f, "pretty"),
        }
    }
}

/// Configuration for logging initialization
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: String,
    pub verbose: bool,
}

impl LoggingConfig {
    pub fn new(format: LogFormat, level: String, verbose: bool) -> Self {
        Self {
            format,
            level,
            verbose,
        }
    }

    /// Resolve format and level from the environment for the given mode
    ///
    /// `format` overrides `FEEDCAST_LOG_FORMAT` when given.
    pub fn for_mode(mode: PublishMode, format: Option<LogFormat>, verbose: bool) -> Self {
        let format = format
            .or_else(|| {
                std::env::var("FEEDCAST_LOG_FORMAT")
                    .ok()
                    .and_then(|s| s.parse().ok())
            })
            .unwrap_or(LogFormat::Text);

        let level = std::env::var("FEEDCAST_LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| default_level(mode).to_string());

        Self::new(format, level, verbose)
    }

    /// Initialize the global subscriber. Call once at startup.
    ///
    /// A second call is ignored.
    pub fn init(&self) {
        let filter = if self.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::try_new(&self.level).unwrap_or_else(|_| EnvFilter::new("info"))
        };

        let result = match self.format {
            LogFormat::Json => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .flatten_event(true)
                .with_target(true)
                .with_line_number(true)
                .with_file(true)
                .try_init(),
            LogFormat::Pretty => tracing_subscriber::fmt()
                .pretty()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_line_number(true)
                .with_file(true)
                .try_init(),
            LogFormat::Text => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(false)
                .with_level(true)
                .try_init(),
        };

        if let Err(e) = result {
            eprintln!("Logging already initialized: {}", e);
        }
    }
}

/// Resolve settings for `mode` and install the subscriber
pub fn init_for_mode(mode: PublishMode, format: Option<LogFormat>, verbose: bool) {
    LoggingConfig::for_mode(mode, format, verbose).init();
}

/// Default level when nothing is set in the environment
pub fn default_level(mode: PublishMode) -> &'static str {
    match mode {
        PublishMode::DryRun => "debug",
        PublishMode::Live => "error",
    }
}
