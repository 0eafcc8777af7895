/// Errors raised by peak-area and base-peak collaborators
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PeakError {
    /// The service could not be queried at all
    #[error("Peak service failed for '{fragment}' at MS{ms_level}: {reason}")]
    Service {
        /// Fragment being measured
        fragment: String,
        /// MS level of the query
        ms_level: u8,
        /// Reason reported by the service
        reason: String,
    },

    /// Base peak values could not be extracted
    #[error("Base peak extraction failed: {0}")]
    BasePeak(String),

    /// Invalid service configuration
    #[error("Invalid peak tolerance: {0} ppm")]
    InvalidTolerance(f64),
}

/// Errors that abort scoring of one analyte
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvidenceError {
    /// A fragment rule could not be evaluated
    #[error(transparent)]
    Rule(#[from] crate::rules::RuleError),

    /// A peak collaborator failed
    #[error(transparent)]
    Peak(#[from] PeakError),
}
