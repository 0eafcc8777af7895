use crate::chemistry::FormulaError;

/// Errors raised by chain library providers
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    /// No library is registered under the requested name
    #[error("Chain library not found: {0}")]
    NotFound(String),

    /// A library entry carries an unusable formula or label
    #[error("Invalid entry in chain library '{library}': {source}")]
    InvalidEntry {
        /// Library name
        library: String,
        /// Underlying formula problem
        #[source]
        source: FormulaError,
    },

    /// Provider-specific failure
    #[error("Chain library '{library}' could not be loaded: {reason}")]
    Unavailable {
        /// Library name
        library: String,
        /// Reason reported by the provider
        reason: String,
    },
}
