//! Process logging setup. Library code only emits `tracing` events; callers
//! pick one of these initializers once per process.

use crate::{LoggingConfig, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, Registry};

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Name of the per-run log file, e.g. `2024.05.01 13-37.txt`.
pub fn log_file_name() -> String {
    chrono::Local::now().format("%Y.%m.%d %H-%M.txt").to_string()
}

/// Routes all events at `level` and above into a fresh file under `log_dir`.
///
/// Keep the returned guard alive for as long as logs should be flushed.
pub fn init_file_logging(log_dir: &Path, level: &str) -> Result<(WorkerGuard, PathBuf)> {
    std::fs::create_dir_all(log_dir)?;
    let file_name = log_file_name();
    let log_path = log_dir.join(&file_name);

    let appender = tracing_appender::rolling::never(log_dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let subscriber = Registry::default().with(env_filter(level)).with(
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false),
    );
    tracing::subscriber::set_global_default(subscriber).ok();

    Ok((guard, log_path))
}

pub fn init_from_config(config: &LoggingConfig) -> Result<(WorkerGuard, PathBuf)> {
    init_file_logging(&config.log_dir, &config.level)
}

/// Human-readable events on stderr.
pub fn init_console_logging(level: &str) {
    let subscriber = Registry::default()
        .with(env_filter(level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    tracing::subscriber::set_global_default(subscriber).ok();
}
