#![doc = include_str!("../README.md")]

mod cli;

use clap::Parser;
use cli::commands::run;
use cli::config::{CliArgs, CliConfig};
use cli::telemetry::init_telemetry;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = CliConfig::try_from(args)?;

    init_telemetry()?;
    tracing::debug!("Running with config: {config:#?}");

    let stdout = std::io::stdout();
    run(&config, &mut stdout.lock())
}
