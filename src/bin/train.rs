//! Train a pipeline from a YAML configuration

use anyhow::Result;
use clap::Parser;

use pipefit::cli::{run_train, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    run_train(&cli.config)?;
    Ok(())
}
