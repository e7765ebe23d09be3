//! Logging infrastructure for diagram processing
//!
//! This module provides structured logging using the `tracing` crate.
//! It supports configurable log levels and formats, and is designed to be
//! WASM-compatible for future browser support.
//!
//! # Usage
//!
//! ```rust
//! use processmap::core::logging::init_logging;
//!
//! // Initialize with explicit level and format
//! init_logging(Some("debug"), Some("pretty")).expect("first initialization");
//!
//! // Only one subscriber can be installed per process
//! assert!(init_logging(None, None).is_err());
//! ```
//!
//! # Log Levels
//!
//! - `trace`: Very detailed information, typically only interesting when debugging
//! - `debug`: Detailed information for debugging
//! - `info`: General informational messages (default)
//! - `warn`: Warning messages
//! - `error`: Error messages
//!
//! # Log Formats
//!
//! - `compact`: Single-line format, good for production
//! - `pretty`: Multi-line format with colors, good for development
//! - `json`: JSON format, good for log aggregation systems
//!
//! # Environment Variables
//!
//! Logging can be configured via environment variables:
//! - `PROCESSMAP_LOG_LEVEL`: Set log level (trace|debug|info|warn|error)
//! - `PROCESSMAP_LOG_FORMAT`: Set log format (compact|pretty|json)
//! - `RUST_LOG`: Alternative way to set log level (tracing-subscriber standard)
//!
//! # WASM Compatibility
//!
//! The logging infrastructure is designed to work in WASM environments.
//! For WASM builds, use `tracing-wasm` instead of `tracing-subscriber`.
//!
//! # What Gets Logged
//!
//! The draw.io codec never prints. Cells it skips, references it cannot
//! resolve and geometry it default-fills are reported as `debug`/`warn`
//! events inside the `decode_drawio` span; encoding runs inside
//! `encode_drawio` and notation inference inside `detect_notation`.
//!
//! # Filtering Logs
//!
//! You can filter logs by component using the log level syntax:
//!
//! ```bash
//! # Show only codec logs at debug level
//! RUST_LOG="processmap::plugins::drawio=debug" processmap import -i order.drawio
//!
//! # Show all logs at info level, but the notation detectors at trace level
//! RUST_LOG="info,processmap::plugins::notation=trace" processmap detect -i order.drawio
//! ```

use std::str::FromStr;

#[cfg(not(target_arch = "wasm32"))]
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

#[cfg(target_arch = "wasm32")]
use tracing_wasm::WASMLayerConfig;

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Compact single-line format
    #[default]
    Compact,
    /// Pretty multi-line format with colors
    Pretty,
    /// JSON format for log aggregation
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl LogFormat {
    /// Get all valid format names
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }
}

/// Environment variable naming the log level
pub const LEVEL_ENV: &str = "PROCESSMAP_LOG_LEVEL";
/// Environment variable naming the log format
pub const FORMAT_ENV: &str = "PROCESSMAP_LOG_FORMAT";

/// Effective level directive: argument, then `PROCESSMAP_LOG_LEVEL`, then
/// `RUST_LOG`, then `info`
pub fn resolve_level(level: Option<&str>) -> String {
    level
        .map(|s| s.to_string())
        .or_else(|| std::env::var(LEVEL_ENV).ok())
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string())
}

/// Effective format: argument, then `PROCESSMAP_LOG_FORMAT`, then compact
pub fn resolve_format(format: Option<&str>) -> Result<LogFormat, String> {
    match format {
        Some(name) => LogFormat::from_str(name),
        None => match std::env::var(FORMAT_ENV) {
            Ok(name) => LogFormat::from_str(&name),
            Err(_) => Ok(LogFormat::default()),
        },
    }
}

/// Initialize the tracing subscriber with the given log level and format
///
/// Native builds write to stderr so that documents written to stdout stay
/// clean.
///
/// # Arguments
///
/// * `level` - Optional log level string (trace|debug|info|warn|error).
///            If None, uses environment variable `PROCESSMAP_LOG_LEVEL` or `RUST_LOG`,
///            or defaults to `info`.
/// * `format` - Optional log format (compact|pretty|json).
///             If None, uses environment variable `PROCESSMAP_LOG_FORMAT`,
///             or defaults to `compact`.
///
/// # Returns
///
/// Returns an error if initialization fails (e.g., subscriber already initialized).
///
/// # Example
///
/// ```rust
/// use processmap::core::logging::init_logging;
///
/// init_logging(Some("warn"), Some("compact")).expect("first initialization");
/// assert!(init_logging(Some("debug"), Some("pretty")).is_err());
/// ```
pub fn init_logging(
    level: Option<&str>,
    format: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(target_arch = "wasm32")]
    {
        // Browser builds always log to the console at the layer's default level.
        let _ = (level, format);
        tracing_wasm::set_as_global_default_with_config(WASMLayerConfig::default());

        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let log_level = resolve_level(level);
        let filter = if log_level == "off" {
            EnvFilter::new("off")
        } else {
            EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info"))
        };

        let format = resolve_format(format).map_err(|e| format!("Invalid log format: {}", e))?;

        match format {
            LogFormat::Compact => {
                Registry::default()
                    .with(filter)
                    .with(
                        fmt::Layer::default()
                            .with_writer(std::io::stderr)
                            .with_target(false)
                            .with_level(true)
                            .with_file(false)
                            .with_line_number(false)
                            .with_span_events(FmtSpan::NONE),
                    )
                    .try_init()?;
            }
            LogFormat::Pretty => {
                Registry::default()
                    .with(filter)
                    .with(
                        fmt::Layer::default()
                            .with_writer(std::io::stderr)
                            .with_target(true)
                            .with_level(true)
                            .with_file(true)
                            .with_line_number(true)
                            .with_span_events(FmtSpan::ACTIVE)
                            .pretty(),
                    )
                    .try_init()?;
            }
            LogFormat::Json => {
                Registry::default()
                    .with(filter)
                    .with(
                        fmt::Layer::default()
                            .with_writer(std::io::stderr)
                            .with_target(true)
                            .with_level(true)
                            .with_file(true)
                            .with_line_number(true)
                            .with_span_events(FmtSpan::ACTIVE)
                            .json(),
                    )
                    .try_init()?;
            }
        }

        Ok(())
    }
}

/// Initialize logging with default settings (info level, compact format)
///
/// This is a convenience function that calls `init_logging(None, None)`.
pub fn init_default_logging() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(None, None)
}
