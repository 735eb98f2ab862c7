//! # Dispatcher Configuration Module
//!
//! Runtime switches of the [`Dispatcher`](crate::dispatcher::Dispatcher).
//!
//! ## Sources
//!
//! - Environment variables, via [`DispatcherConfig::from_env`]
//! - A TOML document, via [`DispatcherConfig::from_toml_str`] or [`DispatcherConfig::load`]
//! - The builder setters `use_cache`, `debug` and `silent`, which override both
//!
//! ## Environment Variables
//!
//! | Variable | Default | Effect |
//! |---|---|---|
//! | `RESTROUTE_USE_CACHE` | `true` | Memoize successful path matches |
//! | `RESTROUTE_DEBUG` | `false` | Render error bodies to the client |
//! | `RESTROUTE_SILENT` | `false` | Never render error bodies, even in debug mode |
//!
//! Booleans accept `1/0`, `true/false`, `on/off` and `yes/no` (case-insensitive).
//! Unrecognized values fall back to the default.
//!
//! ## TOML
//!
//! ```toml
//! use_cache = false
//! debug = true
//! ```
//!
//! Missing keys take their defaults.

use std::env;
use std::path::Path;

use anyhow::Context as _;
use serde::Deserialize;

/// Dispatcher behavior switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatcherConfig {
    /// Cache successful path matches (default: true)
    pub use_cache: bool,
    /// Render error bodies to the client (default: false)
    pub debug: bool,
    /// Suppress error bodies regardless of `debug` (default: false)
    pub silent: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            use_cache: true,
            debug: false,
            silent: false,
        }
    }
}

impl DispatcherConfig {
    /// Load configuration from `RESTROUTE_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            use_cache: env_flag("RESTROUTE_USE_CACHE").unwrap_or(defaults.use_cache),
            debug: env_flag("RESTROUTE_DEBUG").unwrap_or(defaults.debug),
            silent: env_flag("RESTROUTE_SILENT").unwrap_or(defaults.silent),
        }
    }

    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Invalid dispatcher configuration")
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dispatcher configuration {}", path.display()))?;
        Self::from_toml_str(&raw)
            .with_context(|| format!("Failed to parse dispatcher configuration {}", path.display()))
    }

    /// True when error bodies may be written to the client.
    #[must_use]
    pub fn render_error_bodies(&self) -> bool {
        self.debug && !self.silent
    }
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name).ok().and_then(|v| parse_flag(&v))
}

pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
