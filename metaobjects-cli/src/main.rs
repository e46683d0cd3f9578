//! `metaobjects`: merge metadata documents and print the validated model.
//!
//! Usage:
//!   metaobjects [--strict] [--package acme] [--emit json] car.json sports-car.json

use anyhow::Result;
use clap::Parser;
use metaobjects_cli::{Args, log_level, resolve_config, run_with_config};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    let args = Args::parse();
    let config = resolve_config(&args);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level(&config)));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let output = run_with_config(&args, config)?;
    print!("{output}");
    Ok(())
}
