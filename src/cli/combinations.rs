use anyhow::Result;
use std::path::PathBuf;

use lipidmsn::analysis::MsnAnalyzer;

use super::analyze::read_batch;

/// Print the chain combinations of every analyte in an analysis document
pub fn run(input: PathBuf) -> Result<()> {
    let batch = read_batch(&input)?;

    for entry in &batch.analytes {
        let analyte = &entry.analyte;
        println!(
            "{} {} {}:{};O{}",
            analyte.class, analyte.adduct, analyte.carbons, analyte.double_bonds, analyte.hydroxyls
        );

        let analyzer = match MsnAnalyzer::new(analyte, &batch.rules, &batch.libraries) {
            Ok(Some(analyzer)) => analyzer,
            Ok(None) => {
                println!("  no MSn rules");
                continue;
            }
            Err(e) => {
                println!("  error: {}", e);
                continue;
            }
        };

        for (distribution, combinations) in analyzer.combinations().by_distribution() {
            println!("  [{}] {} combination(s)", distribution, combinations.len());
            for combination in combinations {
                println!("    {}", combination.id());
            }
        }
        println!(
            "  {} unique chain(s)",
            analyzer.possible_chain_objects().len()
        );
    }

    Ok(())
}
