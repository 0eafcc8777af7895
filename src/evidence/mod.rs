//! # Evidence Module
//!
//! Scores measured fragment evidence for one analyte and decides how far up the
//! identification ladder it gets.
//!
//! ## Stages
//!
//! 1. **Head group**: mandatory head fragments must be found (area above the base peak
//!    cutoff at their MS level); mandatory head intensity rules must hold.
//! 2. **Chains**: every generated chain is probed; a chain missing a mandatory fragment
//!    is dropped. Combinations survive when all members survive and the pairwise rules
//!    hold, then the relative chain cutoff runs to its fixed point.
//! 3. **Coverage**: the found fragments must explain a minimum share of the spectrum.
//! 4. **Positions**: for classes with more than one backbone position, position rules
//!    vote and a greedy pass places the chains.
//!
//! Peak measurements come from a [`PeakAreaService`] and a [`BasePeakService`].
//! [`SpectrumPeaks`] implements both over in-memory centroids:
//!
//! ```rust
//! use lipidmsn::evidence::{BasePeakService, Centroid, SpectrumPeaks};
//! use std::collections::BTreeSet;
//!
//! let mut peaks = SpectrumPeaks::new();
//! peaks.add_peak(2, Centroid::new(184.0733, 1.0e6));
//! peaks.add_peak(2, Centroid::new(255.2330, 2.5e5));
//!
//! let base = peaks.extract_base_peak_values(&BTreeSet::from([2])).unwrap();
//! assert_eq!(base[&2], 1.0e6);
//! ```

mod config;
mod cutoff;
mod diagnostics;
mod error;
mod peaks;
mod position;
mod result;
mod scorer;
mod status;


pub use config::ScorerConfig;
pub use cutoff::{aggregate_areas, apply_chain_cutoff, CutoffOutcome, CutoffRemoval};
pub use diagnostics::{Diagnostic, DiagnosticsSink, Reason, Stage};
pub use error::{EvidenceError, PeakError};
pub use peaks::{
    BasePeakService, Centroid, PeakAreaService, PeakQuery, Probe, ProbeStatus, SpectrumPeaks,
};
pub use position::{
    assign_in_order, assign_positions, recommend, Candidate, ChainPosition, PositionAssignment,
    PositionVote, Recommendations, SlotSpec, Unresolved,
};
pub use result::{EvidenceRow, FoundFragment, FulfilledRule, IdentificationResult};
pub use scorer::{EvidenceScorer, ScoringContext};
pub use status::{IdentificationStatus, StatusLadder};
