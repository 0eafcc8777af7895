use anyhow::{Context, Result};
use log::info;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use lipidmsn::analysis::AnalysisBatch;
use lipidmsn::evidence::IdentificationResult;

use super::config::Config;

/// Arguments of the analyze command
pub struct AnalyzeArgs {
    pub input: PathBuf,
    pub config: Option<PathBuf>,
    pub debug: bool,
    pub quantification: bool,
    pub tolerance_ppm: Option<f64>,
    pub output: Option<PathBuf>,
    pub tsv: Option<PathBuf>,
}

/// Score every analyte of an analysis document
pub fn run(args: AnalyzeArgs) -> Result<()> {
    let file_config = match &args.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            Config::from_file(path)?
        }
        None => Config::default(),
    };

    let scorer_config = file_config
        .scoring
        .scorer_config(args.debug, args.quantification);
    let tolerance_ppm = args.tolerance_ppm.or(file_config.scoring.tolerance_ppm);

    let mut batch = read_batch(&args.input)?;
    if let Some(ppm) = tolerance_ppm {
        batch.set_tolerance(ppm).context("Invalid matching tolerance")?;
    }

    info!(
        "Scoring {} analyte(s) from {}",
        batch.analytes.len(),
        args.input.display()
    );

    let mut results = Vec::new();
    let mut failed = 0usize;
    for outcome in batch.analyze_all(&scorer_config) {
        match outcome {
            Ok(result) => {
                println!("{}", result.format_colored());
                results.push(result);
            }
            Err(_) => failed += 1,
        }
    }

    let identified = results.iter().filter(|r| r.is_identified()).count();
    println!(
        "{} analyte(s): {} identified, {} not identified, {} failed",
        results.len() + failed,
        identified,
        results.len() - identified,
        failed
    );

    if let Some(path) = &args.output {
        write_json(path, &results)?;
        info!("Results written to {}", path.display());
    }
    if let Some(path) = &args.tsv {
        write_tsv(path, &results)?;
        info!("Evidence table written to {}", path.display());
    }

    Ok(())
}

pub(super) fn read_batch(path: &Path) -> Result<AnalysisBatch> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;
    AnalysisBatch::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse analysis document: {}", path.display()))
}

fn write_json(path: &Path, results: &[IdentificationResult]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, results).context("Failed to write results")?;
    writer.flush()?;
    Ok(())
}

fn write_tsv(path: &Path, results: &[IdentificationResult]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("Failed to create TSV file: {}", path.display()))?;
    for row in results.iter().flat_map(IdentificationResult::evidence_rows) {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
