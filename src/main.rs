//! # lipidmsn
//!
//! Command-line front end for lipid MSn identification.
//!
//! ## Usage
//!
//! ```bash
//! # Score every analyte of an analysis document
//! lipidmsn analyze batch.json --output results.json --tsv evidence.tsv
//!
//! # Inspect the generated chain combinations
//! lipidmsn combinations batch.json
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
