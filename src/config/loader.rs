//! Configuration loading utilities
//!
//! This module handles loading configuration from various sources with proper
//! precedence and validation.

use super::*;
use crate::core::error::{Error, Result};
use std::env;
use std::fs;
use std::path::Path;

/// Load configuration from environment variables
pub fn load_from_env() -> Result<FramepipeConfig> {
    let mut config = FramepipeConfig::default();
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Load configuration from a JSON file
pub fn load_from_file(path: &Path) -> Result<FramepipeConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        Error::ConfigurationError(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;
    load_from_json(&content)
}

/// Load configuration from a JSON string
pub fn load_from_json(json: &str) -> Result<FramepipeConfig> {
    serde_json::from_str(json)
        .map_err(|e| Error::ConfigurationError(format!("Failed to parse JSON config: {}", e)))
}

/// Load configuration with precedence: file -> env -> defaults
pub fn load_with_precedence<P: AsRef<Path>>(config_file: Option<P>) -> Result<FramepipeConfig> {
    let mut config = match config_file {
        Some(path) => load_from_file(path.as_ref())?,
        None => FramepipeConfig::default(),
    };

    apply_env_overrides(&mut config)?;
    config.validate()?;

    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}

/// Overwrite fields for which a `FRAMEPIPE_*` variable is set
pub fn apply_env_overrides(config: &mut FramepipeConfig) -> Result<()> {
    if let Ok(level) = env::var("FRAMEPIPE_LOG_LEVEL") {
        config.logging.level = level;
    }

    if let Ok(format) = env::var("FRAMEPIPE_LOG_FORMAT") {
        config.logging.format = format;
    }

    if let Ok(root) = env::var("FRAMEPIPE_DIAGNOSTICS_ROOT") {
        config.diagnostics.root = if root.is_empty() {
            None
        } else {
            Some(root.into())
        };
    }

    if let Ok(parallel) = env::var("FRAMEPIPE_PARALLEL_FOLDS") {
        config.execution.parallel_folds = parse_bool(&parallel).ok_or_else(|| {
            Error::ConfigurationError(format!("Invalid FRAMEPIPE_PARALLEL_FOLDS: {}", parallel))
        })?;
    }

    if let Ok(seed) = env::var("FRAMEPIPE_SEED") {
        config.execution.default_seed = seed
            .parse()
            .map_err(|e| Error::ConfigurationError(format!("Invalid FRAMEPIPE_SEED: {}", e)))?;
    }

    Ok(())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
