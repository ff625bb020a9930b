//! docintel CLI: persona-driven document intelligence.
//!
//! Reads a job description and a folder of PDFs, ranks the sections most
//! relevant to the persona's task, and writes the result as JSON.

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
