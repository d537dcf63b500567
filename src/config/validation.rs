//! Configuration validation utilities

use super::*;
use crate::core::error::{Error, Result};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: &[&str] = &["text", "json"];

/// Validate the entire configuration
pub fn validate_config(config: &FramepipeConfig) -> Result<()> {
    validate_logging_config(&config.logging)?;
    validate_execution_config(&config.execution)?;

    Ok(())
}

/// Validate logging configuration
pub fn validate_logging_config(config: &LoggingConfig) -> Result<()> {
    if !LOG_LEVELS.contains(&config.level.to_ascii_lowercase().as_str()) {
        return Err(Error::ConfigurationError(format!(
            "Invalid log level: {}. Valid levels: {}",
            config.level,
            LOG_LEVELS.join(", ")
        )));
    }

    if !LOG_FORMATS.contains(&config.format.as_str()) {
        return Err(Error::ConfigurationError(format!(
            "Invalid log format: {}. Valid formats: {}",
            config.format,
            LOG_FORMATS.join(", ")
        )));
    }

    Ok(())
}

/// Validate execution configuration
pub fn validate_execution_config(config: &ExecutionConfig) -> Result<()> {
    if !(config.degenerate_tolerance.is_finite() && config.degenerate_tolerance > 0.0) {
        return Err(Error::ConfigurationError(format!(
            "degenerate_tolerance must be a positive number, got {}",
            config.degenerate_tolerance
        )));
    }

    Ok(())
}
