//! Evaluate a trained pipeline on the held-out split

use anyhow::Result;
use clap::Parser;

use pipefit::cli::{run_evaluate, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    run_evaluate(&cli.config)?;
    Ok(())
}
