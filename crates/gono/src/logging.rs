//! Logging setup.
//!
//! The terminal belongs to the TUI, so log records go to a daily rotated
//! file under the configured log directory instead of stderr.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// Prefix of rotated log files (`gono.YYYY-MM-DD.log`).
pub const LOG_FILE_PREFIX: &str = "gono";

/// Pick the filter directive from the configured level and `--verbose`.
pub fn filter_directive(configured: &str, verbose: bool) -> String {
    if verbose {
        "debug".to_string()
    } else {
        configured.to_lowercase()
    }
}

/// Install the global subscriber writing to the log directory.
///
/// `RUST_LOG` takes precedence over both the configured level and
/// `--verbose`. Keep the returned guard alive until exit so buffered
/// records are flushed.
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<WorkerGuard> {
    let appender = file_appender(&config.log_dir)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(&config.log_level, verbose)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!(
        "Logging to {:?} (gono {})",
        config.log_dir,
        env!("CARGO_PKG_VERSION")
    );
    Ok(guard)
}

fn file_appender(dir: &Path) -> Result<RollingFileAppender> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .build(dir)
        .with_context(|| format!("Failed to open log file in {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_filter_directive_uses_config() {
        assert_eq!(filter_directive("warn", false), "warn");
        assert_eq!(filter_directive("INFO", false), "info");
    }

    #[test]
    fn test_filter_directive_verbose_forces_debug() {
        assert_eq!(filter_directive("error", true), "debug");
    }

    #[test]
    fn test_file_appender_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("logs").join("nested");

        let appender = file_appender(&dir);

        assert!(appender.is_ok());
        assert!(dir.is_dir());
    }

    #[test]
    fn test_file_appender_rejects_file_as_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("occupied");
        fs::write(&file, "x").unwrap();

        assert!(file_appender(&file).is_err());
    }
}
