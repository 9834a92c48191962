//! LeadCollector CLI — find LinkedIn posts with B2B buying intent.
//!
//! Scrapes an example post, searches for similar public posts, scores each
//! with Gemini and exports the qualified leads as CSV.

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
