mod app;

use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;

use beerlist::compose::MainQueue;
use beerlist::config::Config;
use beerlist::logging;

#[derive(Parser, Debug)]
#[command(name = "beerlist")]
#[command(about = "Browse beers, with images cached for offline use")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/beerlist/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: app::Command,
}

fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = Config::load(args.config.as_deref())?;
  let _log_guard = logging::init(&config.log)?;

  // Network work runs on tokio; callbacks come back to this thread.
  let runtime = tokio::runtime::Builder::new_multi_thread()
    .enable_all()
    .thread_name("beerlist-io")
    .build()
    .map_err(|e| eyre!("Failed to start async runtime: {}", e))?;
  let (queue, main_loop) = MainQueue::bind_current();

  let app = app::App::new(&config, runtime.handle().clone(), queue)?;
  app.run(args.command, main_loop)
}
