use serde::{Deserialize, Serialize};

/// Configuration for the evidence scorer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Keep evaluating past a discard and record a diagnostic trail.
    /// Never changes the final status.
    pub debug: bool,

    /// Treat fragments marked `quant` as mandatory
    pub quantification: bool,
}

impl ScorerConfig {
    /// Identification only, fast exit on discard (default)
    pub fn identification() -> Self {
        Self::default()
    }

    /// Identification with quantification fragments required
    pub fn quantification() -> Self {
        Self {
            quantification: true,
            ..Self::default()
        }
    }

    /// Full evaluation with diagnostics
    pub fn debugging() -> Self {
        Self {
            debug: true,
            ..Self::default()
        }
    }

    /// Set debug mode
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set quantification mode
    pub fn with_quantification(mut self, quantification: bool) -> Self {
        self.quantification = quantification;
        self
    }
}
