use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod analyze;
mod combinations;
mod config;

/// lipidmsn - Lipid MSn Identification
#[derive(Parser)]
#[command(name = "lipidmsn")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score the analytes of an analysis document
    Analyze {
        /// Input JSON document (rules, libraries, analytes with spectra)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Load scoring settings from a TOML config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Keep scoring after a discard and record diagnostics
        #[arg(long)]
        debug: bool,

        /// Require fragments marked for quantification
        #[arg(long)]
        quantification: bool,

        /// Override the matching tolerance of every spectrum (ppm)
        #[arg(long, value_name = "PPM")]
        tolerance_ppm: Option<f64>,

        /// Write the identification results as JSON
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Write the found fragments as a TSV table
        #[arg(long, value_name = "FILE")]
        tsv: Option<PathBuf>,
    },

    /// List the chain combinations generated for each analyte
    Combinations {
        /// Input JSON document
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze {
            input,
            config,
            debug,
            quantification,
            tolerance_ppm,
            output,
            tsv,
        } => analyze::run(analyze::AnalyzeArgs {
            input,
            config,
            debug,
            quantification,
            tolerance_ppm,
            output,
            tsv,
        }),
        Commands::Combinations { input } => combinations::run(input),
    }
}
