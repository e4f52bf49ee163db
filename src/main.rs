//! popmenu CLI
//!
//! Usage: popmenu [OPTIONS] [TITLE] < menu.txt

use anyhow::Result;
use clap::Parser;

use popmenu::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    popmenu::logging::init(cli.verbose);
    popmenu::app::run(cli)
}
