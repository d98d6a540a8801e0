mod cli;
mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::Parser;

use crate::cli::Args;
use crate::config::Config;
use crate::logging::setup_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);

    let config = Config::load()?.with_args(&args);
    tracing::debug!(
        data_dir = %config.data_dir.display(),
        online = config.backend().is_some(),
        "configuration loaded"
    );

    commands::run(args.command, &config).await
}
