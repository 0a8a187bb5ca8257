//! EduTrack CLI: education records of public officials, politicians and
//! their families.
//!
//! Stores records in a local database, extracts education info from free
//! text, imports scraped records and prints education statistics.

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
