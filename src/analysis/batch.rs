//! Self-contained analysis documents: rules, chain libraries and per-analyte spectra in
//! one serde-loadable value.

use std::io::Read;

use log::warn;
use serde::{Deserialize, Serialize};

use super::{analyze, AnalysisError, AnalyteParameters};
use crate::chains::ChainLibraries;
use crate::evidence::{IdentificationResult, PeakError, ScorerConfig, SpectrumPeaks};
use crate::rules::RuleSet;

/// One analyte and its measured spectra
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyteSpectra {
    /// Precursor identification
    pub analyte: AnalyteParameters,
    /// MSn centroids, also used for base peaks
    #[serde(default)]
    pub spectrum: SpectrumPeaks,
}

/// A batch of analytes sharing one rule set and one set of chain libraries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisBatch {
    /// Rule tables by class
    #[serde(default)]
    pub rules: RuleSet,
    /// Chain libraries by name
    #[serde(default)]
    pub libraries: ChainLibraries,
    /// Analytes in input order
    #[serde(default)]
    pub analytes: Vec<AnalyteSpectra>,
}

impl AnalysisBatch {
    /// Parse a JSON document
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    /// Override the matching tolerance of every spectrum
    pub fn set_tolerance(&mut self, tolerance_ppm: f64) -> Result<(), PeakError> {
        for entry in &mut self.analytes {
            entry.spectrum = std::mem::take(&mut entry.spectrum).with_tolerance(tolerance_ppm)?;
        }
        Ok(())
    }

    /// Identify every analyte.
    ///
    /// A failing analyte does not stop the batch; its error takes its slot in the output.
    pub fn analyze_all(
        &self,
        config: &ScorerConfig,
    ) -> Vec<Result<IdentificationResult, AnalysisError>> {
        self.analytes
            .iter()
            .map(|entry| {
                let outcome = analyze(
                    &entry.analyte,
                    &self.rules,
                    &self.libraries,
                    &entry.spectrum,
                    &entry.spectrum,
                    config,
                );
                if let Err(e) = &outcome {
                    warn!(
                        "{} {} {}:{}: {}",
                        entry.analyte.class,
                        entry.analyte.adduct,
                        entry.analyte.carbons,
                        entry.analyte.double_bonds,
                        e
                    );
                }
                outcome
            })
            .collect()
    }
}
