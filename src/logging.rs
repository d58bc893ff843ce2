//! Tracing setup.
//!
//! The wizard owns the terminal, so its events go to a per-session file under
//! `<output>/logs/`. CLI subcommands write to stderr.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Keeps the file writer alive; buffered events are flushed on drop
pub struct LoggingHandle {
    pub _guard: Option<WorkerGuard>,
    /// Set when events go to a session log file
    pub log_file_path: Option<PathBuf>,
}

/// Where events are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    File(PathBuf),
    Stderr,
}

impl LogSink {
    /// File sink for wizard sessions with file logging on, stderr otherwise
    pub fn select(config: &Config, is_tui_mode: bool, now: chrono::DateTime<chrono::Utc>) -> Self {
        if is_tui_mode && config.logging.to_file {
            LogSink::File(config.logs_path().join(log_file_name(now)))
        } else {
            LogSink::Stderr
        }
    }
}

pub fn log_file_name(now: chrono::DateTime<chrono::Utc>) -> String {
    format!("dashmigrate-{}.log", now.format("%Y%m%dT%H%M%SZ"))
}

/// Filter directive: `RUST_LOG` wins, then `--debug`, then the config level
fn level_directive(config: &Config, debug_override: bool) -> String {
    if let Ok(env) = std::env::var(EnvFilter::DEFAULT_ENV) {
        return env;
    }
    if debug_override {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    }
}

pub fn init_logging(
    config: &Config,
    is_tui_mode: bool,
    debug_override: bool,
) -> Result<LoggingHandle> {
    let filter = EnvFilter::new(level_directive(config, debug_override));

    match LogSink::select(config, is_tui_mode, chrono::Utc::now()) {
        LogSink::File(path) => {
            let (dir, file_name) = match (path.parent(), path.file_name()) {
                (Some(dir), Some(name)) => (dir.to_path_buf(), name.to_os_string()),
                _ => anyhow::bail!("invalid log file path {}", path.display()),
            };
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(&dir, file_name));
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();

            Ok(LoggingHandle {
                _guard: Some(guard),
                log_file_path: Some(path),
            })
        }
        LogSink::Stderr => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .init();

            Ok(LoggingHandle {
                _guard: None,
                log_file_path: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.paths.output = temp_dir.path().to_string_lossy().to_string();
        config
    }

    fn at() -> chrono::DateTime<chrono::Utc> {
        chrono::Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_log_file_name_format() {
        assert_eq!(log_file_name(at()), "dashmigrate-20240601T093000Z.log");
    }

    #[test]
    fn test_wizard_session_logs_to_output_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let sink = LogSink::select(&config, true, at());
        assert_eq!(
            sink,
            LogSink::File(
                temp_dir
                    .path()
                    .join("logs")
                    .join("dashmigrate-20240601T093000Z.log")
            )
        );
    }

    #[test]
    fn test_cli_and_disabled_file_logging_use_stderr() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_config(&temp_dir);
        assert_eq!(LogSink::select(&config, false, at()), LogSink::Stderr);

        config.logging.to_file = false;
        assert_eq!(LogSink::select(&config, true, at()), LogSink::Stderr);
    }
}
