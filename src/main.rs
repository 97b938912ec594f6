//! CLI entry point for the grid wave function collapse solver

use clap::Parser;
use gridwfc::io::cli::{Cli, SolveProcessor};
use tracing::Level;

fn main() -> gridwfc::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let processor = SolveProcessor::new(cli);
    processor.process()
}
