//! Tracing subscriber setup.

use crate::config::LoggingConfig;
use crate::error::{PondError, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Environment variable that overrides the configured filter.
pub const LOG_ENV: &str = "POND_LOG";

/// Resolve the filter: `POND_LOG`, then `RUST_LOG`, then the config value.
pub fn filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(&config.filter))
}

/// Install the global subscriber.
///
/// Logs go to stderr so stdout stays free for results. When a directory is
/// configured a daily-rolling file is written too; keep the returned guard
/// alive until shutdown so buffered lines are flushed.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.ansi);

    let (file, guard) = match &config.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "pond.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter(config))
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| PondError::Logging(e.to_string()))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_filter_prefers_env() {
        std::env::set_var(LOG_ENV, "warn");
        let f = filter(&LoggingConfig::default());
        std::env::remove_var(LOG_ENV);
        assert_eq!(f.to_string(), "warn");
    }

    #[test]
    #[serial]
    fn test_filter_falls_back_to_config() {
        std::env::remove_var(LOG_ENV);
        std::env::remove_var("RUST_LOG");
        let config = LoggingConfig {
            filter: "debug".to_string(),
            ..LoggingConfig::default()
        };
        assert_eq!(filter(&config).to_string(), "debug");
    }
}
