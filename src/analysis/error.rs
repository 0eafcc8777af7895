use crate::chains::LibraryError;
use crate::chemistry::FormulaError;
use crate::combinatorics::CombinatoricsError;
use crate::evidence::{EvidenceError, PeakError};
use crate::rules::RuleError;

/// Errors that abort the analysis of one analyte
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Structurally invalid rules
    #[error(transparent)]
    Rule(#[from] RuleError),

    /// The hydroxylation total cannot be split across the chains
    #[error(transparent)]
    Combinatorics(#[from] CombinatoricsError),

    /// The chain library provider failed
    #[error(transparent)]
    Library(#[from] LibraryError),

    /// A peak collaborator failed
    #[error(transparent)]
    Peak(#[from] PeakError),

    /// Invalid analyte formula, label or charge
    #[error("Invalid analyte: {0}")]
    Formula(#[from] FormulaError),
}

impl From<EvidenceError> for AnalysisError {
    fn from(err: EvidenceError) -> Self {
        match err {
            EvidenceError::Rule(e) => Self::Rule(e),
            EvidenceError::Peak(e) => Self::Peak(e),
        }
    }
}
