use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "colorized_output")]
use console::style;
use serde::{Deserialize, Serialize};

use super::diagnostics::Diagnostic;
use super::position::PositionAssignment;
use super::status::IdentificationStatus;
use crate::chains::ChainId;
use crate::rules::RuleScope;

/// A fragment that passed the base peak cutoff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoundFragment {
    /// Theoretical m/z the area was measured at
    pub mz: f64,
    /// Measured area
    pub area: f64,
    /// MS level of the measurement
    pub ms_level: u8,
    /// Whether the signal is attributed to a co-eluting species
    #[serde(default)]
    pub from_other_species: bool,
    /// Observed m/z of the centroid the area was taken from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_mz: Option<f64>,
}

impl FoundFragment {
    /// Observed centroid m/z, falling back to the theoretical one
    pub fn matched_mz(&self) -> f64 {
        self.peak_mz.unwrap_or(self.mz)
    }
}

/// An intensity rule that was fulfilled, with the owner it was evaluated for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfilledRule {
    /// Rule name
    pub rule: String,
    /// Rule scope
    pub scope: RuleScope,
    /// `head`, a chain id or a chain pair like `16:0|18:1`
    pub subject: String,
}

/// One found fragment in flat form, for tabular export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceRow {
    /// Lipid class
    pub class: String,
    /// Adduct or modification
    pub adduct: String,
    /// Final status of the analyte
    pub status: IdentificationStatus,
    /// `head` or the chain id
    pub owner: String,
    /// Fragment name
    pub fragment: String,
    /// Theoretical m/z
    pub mz: f64,
    /// Measured area
    pub area: f64,
    /// MS level
    pub ms_level: u8,
    /// Whether the peak is shared with another species
    pub from_other_species: bool,
}

/// Everything the scorer established for one analyte
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentificationResult {
    /// Lipid class
    pub class: String,
    /// Adduct or modification
    pub adduct: String,
    /// Final status
    pub status: IdentificationStatus,
    /// Every status reached, in order
    pub status_trail: Vec<IdentificationStatus>,
    /// Found head-group fragments by name
    #[serde(default)]
    pub head_fragments: BTreeMap<String, FoundFragment>,
    /// Found fragments of every surviving chain
    #[serde(default)]
    pub chain_fragments: BTreeMap<ChainId, BTreeMap<String, FoundFragment>>,
    /// Fulfilled head, chain and pairwise intensity rules
    #[serde(default)]
    pub fulfilled_intensity_rules: Vec<FulfilledRule>,
    /// Ids of the combinations retained after the cutoff
    #[serde(default)]
    pub valid_combinations: Vec<String>,
    /// Position assignment per retained combination id
    #[serde(default)]
    pub position_assignments: BTreeMap<String, PositionAssignment>,
    /// Base peak intensity per MS level
    #[serde(default)]
    pub base_peak_values: BTreeMap<u8, f64>,
    /// Fraction of the spectrum intensity explained per MS level
    #[serde(default)]
    pub coverage: BTreeMap<u8, f64>,
    /// Diagnostic trail, only in debug mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Vec<Diagnostic>>,
}

impl IdentificationResult {
    /// Empty result at `NoMsnPresent`
    pub fn no_msn(class: impl Into<String>, adduct: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            adduct: adduct.into(),
            status: IdentificationStatus::NoMsnPresent,
            status_trail: vec![IdentificationStatus::NoMsnPresent],
            head_fragments: BTreeMap::new(),
            chain_fragments: BTreeMap::new(),
            fulfilled_intensity_rules: Vec::new(),
            valid_combinations: Vec::new(),
            position_assignments: BTreeMap::new(),
            base_peak_values: BTreeMap::new(),
            coverage: BTreeMap::new(),
            diagnostics: None,
        }
    }

    /// Whether the analyte reached at least `HeadGroupDetected` without a discard
    pub fn is_identified(&self) -> bool {
        self.status.rank().is_some_and(|rank| rank >= 1)
    }

    /// Best available species name per retained combination: positional notation when
    /// every chain is placed, `_`-separated otherwise
    pub fn species_names(&self) -> Vec<String> {
        self.valid_combinations
            .iter()
            .map(|id| match self.position_assignments.get(id) {
                Some(assignment) => assignment.notation(),
                None => id.clone(),
            })
            .collect()
    }

    /// Total number of found fragments
    pub fn found_fragment_count(&self) -> usize {
        self.head_fragments.len() + self.chain_fragments.values().map(BTreeMap::len).sum::<usize>()
    }

    /// Every found fragment as a flat row, head fragments first
    pub fn evidence_rows(&self) -> Vec<EvidenceRow> {
        let head = self
            .head_fragments
            .iter()
            .map(|(name, found)| ("head".to_string(), name, found));
        let chains = self.chain_fragments.iter().flat_map(|(chain, fragments)| {
            fragments
                .iter()
                .map(move |(name, found)| (chain.to_string(), name, found))
        });
        head.chain(chains)
            .map(|(owner, name, found)| EvidenceRow {
                class: self.class.clone(),
                adduct: self.adduct.clone(),
                status: self.status,
                owner,
                fragment: name.clone(),
                mz: found.mz,
                area: found.area,
                ms_level: found.ms_level,
                from_other_species: found.from_other_species,
            })
            .collect()
    }

    /// Format the summary with colors
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            use console::Emoji;

            static OK: Emoji<'_, '_> = Emoji("✓", "[OK]");
            static FAIL: Emoji<'_, '_> = Emoji("✗", "[FAIL]");

            let mut output = String::new();
            output.push_str(&format!(
                "{} {}\n",
                style(&self.class).bold().cyan(),
                style(&self.adduct).cyan()
            ));

            let status = match self.status {
                IdentificationStatus::DiscardHit => format!("{} {}", FAIL, style(self.status).red().bold()),
                IdentificationStatus::NoMsnPresent => format!("{}", style(self.status).yellow().bold()),
                _ => format!("{} {}", OK, style(self.status).green().bold()),
            };
            output.push_str(&format!("{}: {}\n", style("Status").bold(), status));
            output.push_str(&format!(
                "{}: {} head, {} chain\n",
                style("Fragments").bold(),
                style(self.head_fragments.len()).green(),
                style(self.found_fragment_count() - self.head_fragments.len()).green()
            ));
            for name in self.species_names() {
                output.push_str(&format!("  {}\n", style(name).bold()));
            }
            if let Some(diagnostics) = &self.diagnostics {
                output.push_str(&format!("{}:\n", style("Diagnostics").bold().yellow()));
                for entry in diagnostics {
                    output.push_str(&format!("  {}\n", style(entry).dim()));
                }
            }
            output
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            format!("{}", self)
        }
    }
}

impl fmt::Display for IdentificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.class, self.adduct)?;
        writeln!(f, "Status: {}", self.status)?;
        writeln!(
            f,
            "Fragments: {} head, {} chain",
            self.head_fragments.len(),
            self.found_fragment_count() - self.head_fragments.len()
        )?;
        for name in self.species_names() {
            writeln!(f, "  {}", name)?;
        }
        if let Some(diagnostics) = &self.diagnostics {
            writeln!(f, "Diagnostics:")?;
            for entry in diagnostics {
                writeln!(f, "  {}", entry)?;
            }
        }
        Ok(())
    }
}
