//! TOML configuration file support.
//!
//! Scoring settings can live in a config file instead of flags:
//!
//! ```toml
//! # lipidmsn.toml
//! [scoring]
//! debug = false
//! quantification = true
//! tolerance_ppm = 5.0
//! ```
//!
//! Flags given on the command line win over the file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use lipidmsn::evidence::ScorerConfig;

/// Root configuration structure for lipidmsn.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Scoring settings.
    #[serde(default)]
    pub scoring: ScoringConfig,
}

/// Configuration for the analyze command.
#[derive(Debug, Default, Deserialize)]
pub struct ScoringConfig {
    /// Continue past discards and collect diagnostics.
    pub debug: Option<bool>,

    /// Require fragments marked for quantification.
    pub quantification: Option<bool>,

    /// Peak matching tolerance in ppm.
    pub tolerance_ppm: Option<f64>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}

impl ScoringConfig {
    /// Scorer settings from the file, with `true` flags forced on.
    pub fn scorer_config(&self, debug: bool, quantification: bool) -> ScorerConfig {
        ScorerConfig::default()
            .with_debug(debug || self.debug.unwrap_or(false))
            .with_quantification(quantification || self.quantification.unwrap_or(false))
    }
}
