use crate::config::Config;
use color_eyre::{eyre::eyre, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive
pub const LOG_ENV: &str = "HOLOCRON_LOG";

const LOG_FILE: &str = "holocron.log";

/// Install the global subscriber, writing to a log file since the terminal
/// belongs to the UI.
///
/// Keep the returned guard alive until exit or buffered lines are lost.
pub fn init(config: &Config) -> Result<WorkerGuard> {
  let dir = config.log_directory()?;
  std::fs::create_dir_all(&dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let appender = tracing_appender::rolling::never(&dir, LOG_FILE);
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let directive = filter_directive(std::env::var(LOG_ENV).ok(), config.log.filter.as_deref());
  let filter = EnvFilter::try_new(&directive)
    .map_err(|e| eyre!("Invalid log filter '{}': {}", directive, e))?;

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

  Ok(guard)
}

/// Environment wins over the config file; default is `info`.
fn filter_directive(env: Option<String>, config: Option<&str>) -> String {
  env
    .filter(|d| !d.trim().is_empty())
    .or_else(|| config.map(String::from))
    .unwrap_or_else(|| "info".to_string())
}
