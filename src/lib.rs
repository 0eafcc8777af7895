//! # lipidmsn - Lipid MSn Identification Core
//!
//! `lipidmsn` decides, for one lipid precursor, which chain compositions its MSn spectra
//! support and how far the identification goes: head group only, chain composition, or
//! full backbone positions.
//!
//! ## Key Features
//!
//! - **Chain Combinatorics**: Every plausible decomposition of the precursor's sum
//!   composition (carbons, double bonds, hydroxylation sites, isotope labels, oxidation
//!   states) into concrete chains, with permutation-equivalent results collapsed.
//!
//! - **Rule-Driven Fragment Prediction**: Head-group and chain fragments are computed
//!   from class-specific formula expressions such as `$PRECURSOR-$CHAIN+H2O`.
//!
//! - **Evidence Scoring**: A forward-only status ladder driven by mandatory fragments,
//!   intensity rules, a relative chain cutoff and a spectrum coverage gate.
//!
//! - **Position Resolution**: Backbone positions from position-specific intensity
//!   rules; ambiguous chains stay unassigned instead of being guessed.
//!
//! ## Quick Start
//!
//! ```rust
//! use lipidmsn::prelude::*;
//!
//! let rules: RuleSet = serde_json::from_str(r#"{
//!     "PC": {
//!         "topology": { "acyl": 2 },
//!         "head_fragments": [
//!             { "name": "HG", "target": "head", "formula": "C5H15NO4P", "mandatory": "always" }
//!         ],
//!         "chain_fragments": [
//!             { "name": "FA", "target": { "chain": "acyl" }, "formula": "$CHAIN-H", "charge": -1 }
//!         ]
//!     }
//! }"#)?;
//!
//! let mut libraries = ChainLibraries::new();
//! libraries.insert("FA", vec![
//!     ChainEntry {
//!         chain_type: ChainType::Acyl, carbons: 16, double_bonds: 0, hydroxyls: 0,
//!         label: IsotopeLabel::none(), oxidation: None, formula: "C16H32O2".parse()?,
//!     },
//!     ChainEntry {
//!         chain_type: ChainType::Acyl, carbons: 18, double_bonds: 1, hydroxyls: 0,
//!         label: IsotopeLabel::none(), oxidation: None, formula: "C18H34O2".parse()?,
//!     },
//! ]);
//!
//! let mut peaks = SpectrumPeaks::new();
//! peaks.add_peak(2, Centroid::new(184.0733, 1.0e6));
//! peaks.add_peak(2, Centroid::new(255.2330, 2.0e5));
//! peaks.add_peak(2, Centroid::new(281.2486, 3.0e5));
//!
//! let analyte = AnalyteParameters::new("PC", "+H", "C42H83NO8P".parse()?, 34, 1);
//! let result = analyze(&analyte, &rules, &libraries, &peaks, &peaks, &ScorerConfig::default())?;
//!
//! assert_eq!(result.status, IdentificationStatus::FragmentsDetected);
//! assert_eq!(result.valid_combinations, vec!["16:0_18:1"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! The library is organized into the following modules:
//!
//! - [`chemistry`]: Elemental formulas, isotope labels and m/z computation
//! - [`chains`]: Chain value objects and typed chain libraries
//! - [`combinatorics`]: Hydroxylation partitioning and chain combination generation
//! - [`rules`]: Class-specific fragment and intensity rules
//! - [`fragments`]: Theoretical fragment prediction
//! - [`evidence`]: Peak services, the scoring state machine and position resolution
//! - [`analysis`]: The `analyze` entry point and batch analysis documents
//!
//! Rule files, chain libraries and peak integration are supplied by the caller through
//! the [`rules::RuleProvider`], [`chains::ChainLibraryProvider`],
//! [`evidence::PeakAreaService`] and [`evidence::BasePeakService`] traits. In-memory,
//! serde-loadable implementations of each are included.

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod analysis;
pub mod chains;
pub mod chemistry;
pub mod combinatorics;
pub mod evidence;
pub mod fragments;
pub mod rules;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::analysis::{
        analyze, AnalysisBatch, AnalysisError, AnalyteParameters, AnalyteSpectra, MsnAnalyzer,
    };
    pub use crate::chains::{
        Chain, ChainEntry, ChainId, ChainLibraries, ChainLibrary, ChainLibraryProvider,
        ChainType,
    };
    pub use crate::chemistry::{ElementalFormula, FormulaError, IsotopeLabel};
    pub use crate::combinatorics::{
        ChainCombination, ChainTopology, HydroxylRange, PotentialCombinations,
    };
    pub use crate::evidence::{
        BasePeakService, Centroid, EvidenceRow, IdentificationResult, IdentificationStatus,
        PeakAreaService, ScorerConfig, SpectrumPeaks,
    };
    pub use crate::rules::{ClassRules, RuleProvider, RuleSet};
}
