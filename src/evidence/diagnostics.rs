use std::fmt;

use serde::{Deserialize, Serialize};

/// Scoring stage a diagnostic was raised in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// MS level and base peak lookup
    Setup,
    /// Head-group fragments and rules
    HeadGroup,
    /// Chain fragments and rules
    Chains,
    /// Chain-combination cutoff
    Cutoff,
    /// Spectrum coverage gate
    Coverage,
    /// Position resolution
    Position,
}

/// Why something was rejected or left unresolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    /// No MSn spectra at any usable level
    NoMsnLevel,
    /// The fragment's MS level has no spectra
    UnusableLevel,
    /// The peak service found nothing
    MissingPeak,
    /// The peak service reported an extraction failure
    ExtractionFailed,
    /// Area under the base peak cutoff
    BelowBasePeakCutoff,
    /// An intensity rule was not fulfilled
    IntensityRuleFailed,
    /// A chain lost a mandatory fragment or rule
    ChainDiscarded,
    /// A combination lost a member chain or pairwise rule
    CombinationRejected,
    /// A combination fell under the relative chain cutoff
    BelowChainCutoff,
    /// Found fragments explain too little of the spectrum
    CoverageInsufficient,
    /// Mandatory position rules disagree
    ContradictingPositionRules,
    /// Equal evidence for competing positions
    PositionTie,
}

/// One entry of the diagnostic trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stage the entry was recorded in
    pub stage: Stage,
    /// Rejection reason
    pub reason: Reason,
    /// Fragment, rule, chain or combination concerned
    pub subject: String,
    /// Free-form detail
    pub detail: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {:?} {}", self.stage, self.reason, self.subject)?;
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        Ok(())
    }
}

/// Collector for the debug-mode diagnostic trail
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsSink {
    entries: Vec<Diagnostic>,
}

impl DiagnosticsSink {
    /// Empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entry
    pub fn record(
        &mut self,
        stage: Stage,
        reason: Reason,
        subject: impl Into<String>,
        detail: impl Into<String>,
    ) {
        self.entries.push(Diagnostic {
            stage,
            reason,
            subject: subject.into(),
            detail: detail.into(),
        });
    }

    /// Recorded entries
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume into the entries
    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}
