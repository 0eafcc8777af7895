use super::Element;

/// Errors that can occur while parsing or combining elemental formulas
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormulaError {
    /// An element symbol that is not part of the supported element table
    #[error("Unknown element symbol: {0}")]
    UnknownElement(String),

    /// The formula string does not follow the `SymbolCount` notation
    #[error("Malformed formula '{formula}': {reason}")]
    Malformed {
        /// The offending formula string
        formula: String,
        /// What went wrong
        reason: String,
    },

    /// A subtraction left a negative number of atoms
    #[error("Formula '{formula}' has a negative count ({count}) for element {element}")]
    NegativeCount {
        /// Formula after the failed operation
        formula: String,
        /// Element that went negative
        element: Element,
        /// Resulting count
        count: i32,
    },

    /// A label prefix contained elements that are not stable isotopes
    #[error("Isotope label '{0}' may only contain Cc, D and Nn")]
    InvalidLabel(String),

    /// The ion charge must not be zero when computing m/z
    #[error("Cannot compute m/z for charge 0")]
    ZeroCharge,
}
