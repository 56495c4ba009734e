mod app;
mod cache;
mod config;
mod event;
mod logging;
mod query;
mod swapi;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "holocron")]
#[command(about = "A terminal browser for the Star Wars API")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/holocron/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// API base URL (overrides HOLOCRON_API_URL and the config file)
  #[arg(short, long)]
  base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?.with_base_url_override(args.base_url);

  let _log_guard = logging::init(&config)?;
  info!(base_url = %config.api.base_url, "starting");

  // Initialize and run the app
  let mut app = app::App::new(&config)?;
  app.run().await?;

  Ok(())
}
