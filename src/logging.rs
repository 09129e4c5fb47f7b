use color_eyre::{eyre::eyre, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

const LOG_FILE: &str = "beerlist.log";

/// Install the global subscriber, writing to `<dir>/beerlist.log`.
///
/// The filter comes from `BEERLIST_LOG` when set, otherwise from the config
/// level. Keep the returned guard alive for the whole program: dropping it
/// stops the background writer.
pub fn init(config: &LogConfig) -> Result<WorkerGuard> {
  let dir = config.resolved_dir()?;
  std::fs::create_dir_all(&dir).map_err(|e| eyre!("Failed to create log directory: {}", e))?;

  let file_appender = tracing_appender::rolling::never(&dir, LOG_FILE);
  let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

  tracing_subscriber::fmt()
    .with_env_filter(filter(config))
    .with_writer(non_blocking)
    .with_ansi(false)
    .try_init()
    .map_err(|e| eyre!("Failed to install log subscriber: {}", e))?;

  Ok(guard)
}

fn filter(config: &LogConfig) -> EnvFilter {
  let directives = std::env::var("BEERLIST_LOG").unwrap_or_else(|_| config.level.clone());
  EnvFilter::builder().parse_lossy(directives)
}
