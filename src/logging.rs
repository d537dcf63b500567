//! Structured logging setup
//!
//! The library itself only emits `tracing` events; binaries and tests call
//! [`init_logging`] once to install a subscriber.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::validation::validate_logging_config;
use crate::config::LoggingConfig;
use crate::core::error::Result;

/// Install a global fmt subscriber configured from `config`
///
/// `RUST_LOG` takes precedence over the configured level. Returns `Ok(false)`
/// when a global subscriber was already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<bool> {
    validate_logging_config(config)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_ascii_lowercase()));
    let builder = fmt().with_env_filter(filter).with_target(true);

    let installed = if config.format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    Ok(installed.is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_noop() {
        let config = LoggingConfig::default();
        let _ = init_logging(&config).unwrap();
        assert!(!init_logging(&config).unwrap());
    }

    #[test]
    fn test_invalid_level_rejected() {
        let config = LoggingConfig {
            level: "chatty".to_string(),
            ..LoggingConfig::default()
        };
        assert!(init_logging(&config).is_err());
    }
}
