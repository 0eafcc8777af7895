//! # Analysis Module
//!
//! Entry point tying the pipeline together for one analyte: rule lookup, chain library
//! preparation, hydroxylation partitioning, combination generation and evidence scoring.
//!
//! ```rust
//! use lipidmsn::analysis::{analyze, AnalyteParameters};
//! use lipidmsn::chains::ChainLibraries;
//! use lipidmsn::evidence::{IdentificationStatus, ScorerConfig, SpectrumPeaks};
//! use lipidmsn::rules::RuleSet;
//!
//! let analyte = AnalyteParameters::new("PC", "+H", "C42H83NO8P".parse()?, 34, 1);
//! let peaks = SpectrumPeaks::new();
//!
//! // no rules for the class: not an error
//! let result = analyze(
//!     &analyte,
//!     &RuleSet::new(),
//!     &ChainLibraries::new(),
//!     &peaks,
//!     &peaks,
//!     &ScorerConfig::default(),
//! )?;
//! assert_eq!(result.status, IdentificationStatus::NoMsnPresent);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod batch;
mod error;


use std::collections::BTreeMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::chains::{Chain, ChainId, ChainLibrary, ChainLibraryProvider, ChainType};
use crate::chemistry::{ElementalFormula, FormulaError, IsotopeLabel};
use crate::combinatorics::{
    generate, partition_hydroxylation, CombinationRequest, OhDistribution, PotentialCombinations,
};
use crate::evidence::{
    BasePeakService, EvidenceScorer, IdentificationResult, PeakAreaService, ScorerConfig,
    ScoringContext,
};
use crate::rules::{ClassRules, RuleError, RuleProvider};

pub use batch::{AnalysisBatch, AnalyteSpectra};
pub use error::AnalysisError;

fn default_charge() -> i32 {
    1
}

/// Precursor-level identification of one analyte
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyteParameters {
    /// Lipid class, e.g. `PC`
    pub class: String,
    /// Adduct or modification, e.g. `+H`
    pub adduct: String,
    /// Precursor formula including the adduct
    pub formula: ElementalFormula,
    /// Precursor charge
    #[serde(default = "default_charge")]
    pub charge: i32,
    /// Total carbons over all chains
    pub carbons: u32,
    /// Total double bonds over all chains
    pub double_bonds: u32,
    /// Total hydroxylation sites over all chains
    #[serde(default)]
    pub hydroxyls: u32,
    /// Isotope label budget the chains must use up
    #[serde(default)]
    pub label: IsotopeLabel,
    /// Oxidation states the chains must carry
    #[serde(default)]
    pub oxidations: Vec<String>,
}

impl AnalyteParameters {
    /// Unlabelled, non-hydroxylated analyte with charge 1
    pub fn new(
        class: impl Into<String>,
        adduct: impl Into<String>,
        formula: ElementalFormula,
        carbons: u32,
        double_bonds: u32,
    ) -> Self {
        Self {
            class: class.into(),
            adduct: adduct.into(),
            formula,
            charge: default_charge(),
            carbons,
            double_bonds,
            hydroxyls: 0,
            label: IsotopeLabel::none(),
            oxidations: Vec::new(),
        }
    }

    /// Set the hydroxylation total
    pub fn with_hydroxyls(mut self, hydroxyls: u32) -> Self {
        self.hydroxyls = hydroxyls;
        self
    }

    /// Set the isotope label budget
    pub fn with_label(mut self, label: IsotopeLabel) -> Self {
        self.label = label;
        self
    }

    /// Precursor m/z
    pub fn precursor_mz(&self) -> Result<f64, FormulaError> {
        self.formula.mz(self.charge)
    }

    /// Check that the label is part of the formula and the charge is usable
    pub fn validate(&self) -> Result<(), FormulaError> {
        if !self.label.as_formula().fits_within(&self.formula) {
            return Err(FormulaError::InvalidLabel(self.label.to_string()));
        }
        self.precursor_mz().map(|_| ())
    }
}

/// Combinatorics of one analyte against the rules of its class
#[derive(Debug)]
pub struct MsnAnalyzer<'r> {
    analyte: AnalyteParameters,
    rules: &'r ClassRules,
    distributions: Vec<OhDistribution>,
    combinations: PotentialCombinations,
}

impl<'r> MsnAnalyzer<'r> {
    /// Look up the class rules and generate every chain combination.
    ///
    /// Returns `Ok(None)` when the class has no MSn rules.
    pub fn new(
        analyte: &AnalyteParameters,
        rules: &'r dyn RuleProvider,
        libraries: &dyn ChainLibraryProvider,
    ) -> Result<Option<Self>, AnalysisError> {
        analyte.validate()?;

        let class_rules = match rules.class_rules(&analyte.class, &analyte.adduct) {
            Ok(class_rules) => class_rules,
            Err(RuleError::Absent { class }) => {
                info!("No MSn rules for {}", class);
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        class_rules.validate(&analyte.class)?;

        let topology = &class_rules.topology;
        let distributions = partition_hydroxylation(
            analyte.hydroxyls,
            topology,
            class_rules.fa_hydroxyls,
            class_rules.lcb_hydroxyls,
        )?;

        let combinations = if topology.total() == 0 {
            PotentialCombinations::default()
        } else {
            let fatty_acids = Self::fatty_acid_library(analyte, class_rules, libraries)?;
            let lcbs = Self::lcb_library(analyte, class_rules, libraries)?;
            generate(&CombinationRequest {
                carbons: analyte.carbons,
                double_bonds: analyte.double_bonds,
                distributions: &distributions,
                fatty_acids: &fatty_acids,
                lcbs: lcbs.as_ref(),
                label: &analyte.label,
                oxidations: &analyte.oxidations,
            })
        };

        info!(
            "{} {} {}:{};O{}: {} OH distribution(s), {} combination(s), {} chain(s)",
            analyte.class,
            analyte.adduct,
            analyte.carbons,
            analyte.double_bonds,
            analyte.hydroxyls,
            distributions.len(),
            combinations.len(),
            combinations.unique_chains().len()
        );

        Ok(Some(Self {
            analyte: analyte.clone(),
            rules: class_rules,
            distributions,
            combinations,
        }))
    }

    fn fatty_acid_library(
        analyte: &AnalyteParameters,
        rules: &ClassRules,
        libraries: &dyn ChainLibraryProvider,
    ) -> Result<ChainLibrary, AnalysisError> {
        let mut library = libraries.chains_by_type(&rules.fa_library)?;
        let topology = &rules.topology;
        if topology.count(ChainType::Alkyl) + topology.count(ChainType::Alkenyl) > 0 {
            library = library.with_ether_variants();
        }
        debug!("FA library '{}': {} chains", rules.fa_library, library.len());
        Ok(library.plausible_for(&analyte.formula))
    }

    fn lcb_library(
        analyte: &AnalyteParameters,
        rules: &ClassRules,
        libraries: &dyn ChainLibraryProvider,
    ) -> Result<Option<ChainLibrary>, AnalysisError> {
        if rules.topology.lcb == 0 {
            return Ok(None);
        }
        let name = rules.lcb_library.as_deref().ok_or_else(|| {
            RuleError::violation(analyte.class.as_str(), "lcb_library", "class has LCB chains but no LCB library")
        })?;
        let library = libraries.chains_by_type(name)?;
        Ok(Some(library.plausible_for(&analyte.formula)))
    }

    /// The analyte
    pub fn analyte(&self) -> &AnalyteParameters {
        &self.analyte
    }

    /// Rules of the analyte's class
    pub fn rules(&self) -> &ClassRules {
        self.rules
    }

    /// Hydroxylation distributions the combinations were generated for
    pub fn distributions(&self) -> &[OhDistribution] {
        &self.distributions
    }

    /// Every generated combination
    pub fn combinations(&self) -> &PotentialCombinations {
        &self.combinations
    }

    /// Every chain used by at least one combination
    pub fn possible_chain_objects(&self) -> &BTreeMap<ChainId, Chain> {
        self.combinations.unique_chains()
    }

    /// Score measured evidence against the generated combinations
    pub fn score(
        &self,
        peaks: &dyn PeakAreaService,
        base_peaks: &dyn BasePeakService,
        config: &ScorerConfig,
    ) -> Result<IdentificationResult, AnalysisError> {
        let context = ScoringContext {
            class: &self.analyte.class,
            adduct: &self.analyte.adduct,
            precursor: &self.analyte.formula,
            hydroxyls: self.analyte.hydroxyls,
            rules: self.rules,
            combinations: &self.combinations,
        };
        Ok(EvidenceScorer::new(context, peaks, base_peaks, *config).score()?)
    }
}

/// Identify one analyte.
///
/// A class without MSn rules yields a `NoMsnPresent` result rather than an error.
pub fn analyze(
    analyte: &AnalyteParameters,
    rules: &dyn RuleProvider,
    libraries: &dyn ChainLibraryProvider,
    peaks: &dyn PeakAreaService,
    base_peaks: &dyn BasePeakService,
    config: &ScorerConfig,
) -> Result<IdentificationResult, AnalysisError> {
    match MsnAnalyzer::new(analyte, rules, libraries)? {
        Some(analyzer) => analyzer.score(peaks, base_peaks, config),
        None => Ok(IdentificationResult::no_msn(
            analyte.class.as_str(),
            analyte.adduct.as_str(),
        )),
    }
}
