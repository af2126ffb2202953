//! Structured logging setup.
//!
//! `RUST_LOG` takes precedence over the configured level, matching the
//! usual `tracing-subscriber` convention.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Errors that can occur while installing the global subscriber.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// A global subscriber was already installed.
    #[error("tracing subscriber already initialized: {message}")]
    AlreadyInitialized {
        /// Description from `tracing-subscriber`.
        message: String,
    },
}

/// Install the global `tracing` subscriber.
///
/// Returns an error instead of panicking when called more than once.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|err| TelemetryError::AlreadyInitialized {
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_initialization_is_an_error_not_a_panic() {
        let config = LoggingConfig::default();
        let _ = init_tracing(&config);
        let second = init_tracing(&config);
        assert!(matches!(
            second,
            Err(TelemetryError::AlreadyInitialized { .. })
        ));
    }
}
