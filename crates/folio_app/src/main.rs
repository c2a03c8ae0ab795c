mod app;
mod cli;
mod config;
mod logging;

use anyhow::Result;
use clap::Parser;

use cli::Cli;
use config::FolioConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = FolioConfig::load(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(destination) = cli.log {
        config.log_destination = destination;
    }

    logging::initialize(
        config.log_destination,
        folio_logging::level_from_name(&config.log_level),
    );
    app::run(&config, cli.command)
}
