use std::fmt::Display;

/// Errors raised while reading or applying fragmentation rules
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleError {
    /// A structural problem in the supplied rules; fatal for the analyte
    #[error("Rule violation in class '{class}', rule '{rule}': {reason}")]
    Violation {
        /// Lipid class the rule belongs to
        class: String,
        /// Offending rule name
        rule: String,
        /// What is wrong with it
        reason: String,
    },

    /// No MSn rules exist for the class; the normal no-evidence case
    #[error("No MSn rules defined for class '{class}'")]
    Absent {
        /// Requested class (and adduct)
        class: String,
    },
}

impl RuleError {
    /// Build a [`RuleError::Violation`]
    pub fn violation(class: impl Into<String>, rule: impl Into<String>, reason: impl Display) -> Self {
        Self::Violation {
            class: class.into(),
            rule: rule.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this is the non-fatal "rules absent" signal
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent { .. })
    }
}

/// Errors raised by fragment formula expressions
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExpressionError {
    /// Nothing to evaluate
    #[error("Empty formula expression")]
    Empty,

    /// An operator without an operand, e.g. `$PRECURSOR-`
    #[error("Dangling operator in '{0}'")]
    DanglingOperator(String),

    /// A `$NAME` placeholder other than `$PRECURSOR` and `$CHAIN`
    #[error("Unknown placeholder '${0}'")]
    UnknownPlaceholder(String),

    /// `$CHAIN` evaluated without a chain
    #[error("Expression references $CHAIN but no chain was supplied")]
    MissingChain,

    /// Literal parse failure or negative element count after evaluation
    #[error("Formula error: {0}")]
    Formula(#[from] crate::chemistry::FormulaError),
}
