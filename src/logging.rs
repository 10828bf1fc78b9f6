//! Tracing setup. The dashboard owns the terminal, so it logs to a file; the
//! one-shot CLI commands log to stderr.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Filter directives, e.g. `debug` or `items_dash=trace`
pub const LOG_ENV: &str = "ITEMS_DASH_LOG";

const DEFAULT_LEVEL: &str = "info";

fn env_filter() -> Result<EnvFilter> {
  let directives = std::env::var(LOG_ENV).unwrap_or_else(|_| DEFAULT_LEVEL.to_string());
  EnvFilter::try_new(&directives).map_err(|e| eyre!("Invalid {} value '{}': {}", LOG_ENV, directives, e))
}

/// `$XDG_DATA_HOME/items-dash/logs`, or `./logs` when there is no data dir
pub fn log_dir() -> PathBuf {
  dirs::data_dir()
    .map(|d| d.join("items-dash").join("logs"))
    .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Log to a daily-rolling file. Keep the guard alive until exit so buffered
/// lines are flushed.
pub fn init_file_logging() -> Result<WorkerGuard> {
  let dir = log_dir();
  std::fs::create_dir_all(&dir)?;

  let appender = tracing_appender::rolling::daily(&dir, "items-dash.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let file_layer = fmt::layer()
    .with_writer(writer)
    .with_target(true)
    .with_ansi(false)
    .with_file(true)
    .with_line_number(true)
    .with_filter(env_filter()?);

  tracing_subscriber::registry()
    .with(file_layer)
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

  tracing::debug!(dir = %dir.display(), "File logging initialized");
  Ok(guard)
}

/// Log to stderr, leaving stdout for command output
pub fn init_stderr_logging() -> Result<()> {
  let console_layer = fmt::layer()
    .with_writer(std::io::stderr)
    .with_target(false)
    .with_filter(env_filter()?);

  tracing_subscriber::registry()
    .with(console_layer)
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))
}
