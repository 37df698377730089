//! Tracing setup: events go to `<home>/logs/<file>` so command output on
//! stdout stays clean.

use std::fs;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{Config, paths};

/// Environment variable holding a filter directive, e.g. `debug` or
/// `forgeguard_core::api=trace`.
pub const LOG_ENV: &str = "FORGEGUARD_LOG";

/// Filter from `FORGEGUARD_LOG`, else the configured level, else `info`.
pub fn env_filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.log.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber writing to the configured log file.
///
/// The returned guard flushes buffered events when dropped; keep it alive
/// for the lifetime of the process. Installing twice is a no-op.
///
/// # Errors
/// Returns an error if the log directory cannot be created.
pub fn init(config: &Config) -> Result<WorkerGuard> {
    let dir = paths::logs_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(&dir, &config.log.file);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let _ = fmt()
        .with_env_filter(env_filter(config))
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer)
        .try_init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_falls_back_to_info() {
        if std::env::var(LOG_ENV).is_ok() {
            return;
        }
        let mut config = Config::default();
        config.log.level = "forgeguard=loudest".to_string();
        assert_eq!(env_filter(&config).to_string(), "info");

        config.log.level = "debug".to_string();
        assert_eq!(env_filter(&config).to_string(), "debug");
    }
}
