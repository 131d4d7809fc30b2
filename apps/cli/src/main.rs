//! anyload CLI — load and normalize heterogeneous content from the shell.
//!
//! Feeds literal arguments (or `@file` references) through a default loader
//! and prints the composed result as JSON.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
