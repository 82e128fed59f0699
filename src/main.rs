mod config;
mod replay;

use anyhow::{Context, Result};
use clap::Parser;
use config::{CliConfig, Config};
use ledger_engine::Ledger;
use std::fs::File;
use std::io;
use tracing::info;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = CliConfig::parse();

    replay_ledger(&config)?;

    info!("Replay completed successfully");

    Ok(())
}

fn replay_ledger<C: Config>(config: &C) -> Result<()> {
    let ledger = Ledger::new();

    let input = File::open(config.input_path()).context("Failed to open input file")?;
    replay::apply_operations(&ledger, input)?;

    let stdout = io::stdout();
    let handle = stdout.lock();

    if config.history() {
        replay::write_history(&ledger, handle)
    } else {
        replay::write_balances(&ledger, handle)
    }
}
