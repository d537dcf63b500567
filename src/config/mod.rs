//! Configuration management for framepipe
//!
//! Settings come from three layers, later ones winning:
//! - built-in defaults
//! - a JSON configuration file
//! - `FRAMEPIPE_*` environment variables

use crate::core::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub mod loader;
pub mod validation;

/// Main configuration structure for framepipe
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FramepipeConfig {
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Where diagnostic artifacts (metrics, figures) are written
    pub diagnostics: DiagnosticsConfig,
    /// Execution settings for fitting
    pub execution: ExecutionConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log output format (json, text)
    pub format: String,
}

/// Diagnostic output configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Root directory for per-run diagnostic scopes; `None` disables output
    pub root: Option<PathBuf>,
}

/// Execution configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Fit cross-validation folds on the rayon thread pool
    pub parallel_folds: bool,
    /// Seed used by splitters built from this configuration
    pub default_seed: u64,
    /// Absolute tolerance under which a scaling statistic counts as zero
    pub degenerate_tolerance: f64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            parallel_folds: false,
            default_seed: 42,
            degenerate_tolerance: 1e-9,
        }
    }
}

impl FramepipeConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        loader::load_from_env()
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        loader::load_from_file(path.as_ref())
    }

    /// Load configuration with precedence: file -> env -> defaults
    pub fn load_with_precedence<P: AsRef<Path>>(config_file: Option<P>) -> Result<Self> {
        loader::load_with_precedence(config_file)
    }

    /// Validate configuration and return errors if invalid
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}
