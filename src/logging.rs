//! Structured logging initialization.
//!
//! The router itself only emits `tracing` events; installing a subscriber is
//! left to the host application. This module offers the default setup: an
//! `EnvFilter` (honouring `RUST_LOG` first) plus a JSON or pretty fmt layer,
//! optionally written through a non-blocking appender.
//!
//! ## Environment Variables
//!
//! - `RESTROUTE_LOG_LEVEL`: `trace`/`debug`/`info`/`warn`/`error` (default `info`)
//! - `RESTROUTE_LOG_FORMAT`: `json` or `pretty` (default `json`)
//! - `RESTROUTE_LOG_ASYNC`: buffer output on a background thread (default `false`)
//! - `RESTROUTE_LOG_TARGET_FILTER`: extra comma-separated filter directives,
//!   e.g. `restroute::router=trace,hyper=warn`
//! - `RESTROUTE_LOG_INCLUDE_LOCATION`: add `file:line` to events (default `false`)

use std::env;

use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::parse_flag;

/// Log format: JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level: trace/debug/info/warn/error
    pub log_level: String,
    /// Log format: json/pretty
    pub format: LogFormat,
    /// Write through a non-blocking background appender
    pub async_logging: bool,
    /// Extra filter directives (comma-separated)
    pub target_filter: Option<String>,
    /// Include file:line location
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Json,
            async_logging: false,
            target_filter: None,
            include_location: false,
        }
    }
}

impl LogConfig {
    /// Parse configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: env::var("RESTROUTE_LOG_LEVEL").unwrap_or(defaults.log_level),
            format: env::var("RESTROUTE_LOG_FORMAT")
                .map(|v| LogFormat::parse(&v))
                .unwrap_or(defaults.format),
            async_logging: env::var("RESTROUTE_LOG_ASYNC")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.async_logging),
            target_filter: env::var("RESTROUTE_LOG_TARGET_FILTER").ok(),
            include_location: env::var("RESTROUTE_LOG_INCLUDE_LOCATION")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.include_location),
        }
    }

    /// Development defaults: pretty output at debug level with locations.
    #[must_use]
    pub fn default_dev() -> Self {
        Self {
            log_level: "debug".to_string(),
            format: LogFormat::Pretty,
            async_logging: false,
            target_filter: None,
            include_location: true,
        }
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    fn env_filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level().as_str()));

        if let Some(targets) = &self.target_filter {
            for directive in targets.split(',').map(str::trim).filter(|d| !d.is_empty()) {
                match directive.parse() {
                    Ok(d) => filter = filter.add_directive(d),
                    Err(_) => eprintln!("Warning: Invalid log filter directive: {directive}"),
                }
            }
        }
        filter
    }
}

/// Install the global `tracing` subscriber described by `config`.
///
/// In async mode the returned guard flushes buffered events when dropped; keep
/// it alive for the lifetime of the process.
///
/// Fails if a global subscriber is already installed.
///
/// # Example
///
/// ```no_run
/// use restroute::logging::{init_logging, LogConfig};
///
/// let _guard = init_logging(&LogConfig::from_env()).expect("logging");
/// ```
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let registry = tracing_subscriber::registry().with(config.env_filter());

    if config.async_logging {
        let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
        let fmt_layer = match config.format {
            LogFormat::Json => tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_writer(writer)
                .boxed(),
            LogFormat::Pretty => tracing_subscriber::fmt::layer()
                .pretty()
                .with_target(true)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_writer(writer)
                .boxed(),
        };
        registry
            .with(fmt_layer)
            .try_init()
            .context("Failed to initialize async logging")?;
        Ok(Some(guard))
    } else {
        let fmt_layer = match config.format {
            LogFormat::Json => tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .boxed(),
            LogFormat::Pretty => tracing_subscriber::fmt::layer()
                .pretty()
                .with_target(true)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .boxed(),
        };
        registry
            .with(fmt_layer)
            .try_init()
            .context("Failed to initialize sync logging")?;
        Ok(None)
    }
}
