//! coursecrawl CLI: catalog listing and course detail enrichment.
//!
//! `--mode list` writes the dated course listing; `--mode details` enriches
//! stored course records from their detail pages.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli)?;
    commands::run(cli).await
}
