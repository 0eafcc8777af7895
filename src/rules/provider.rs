use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::{ClassRules, FragmentRule, IntensityRule, RuleError};
use crate::chains::ChainType;
use crate::combinatorics::{ChainTopology, HydroxylRange};

/// Source of class-specific MSn rules.
///
/// Only [`RuleProvider::class_rules`] is required; the per-aspect getters read from it.
/// A class without rules yields [`RuleError::Absent`], which is not a failure.
pub trait RuleProvider {
    /// All rules of `class` measured as `adduct`
    fn class_rules(&self, class: &str, adduct: &str) -> Result<&ClassRules, RuleError>;

    /// Head-group fragment rules
    fn head_fragment_rules(&self, class: &str, adduct: &str) -> Result<&[FragmentRule], RuleError> {
        Ok(&self.class_rules(class, adduct)?.head_fragments)
    }

    /// Chain fragment rules
    fn chain_fragment_rules(&self, class: &str, adduct: &str) -> Result<&[FragmentRule], RuleError> {
        Ok(&self.class_rules(class, adduct)?.chain_fragments)
    }

    /// Head-group intensity rules
    fn head_intensity_rules(&self, class: &str, adduct: &str) -> Result<&[IntensityRule], RuleError> {
        Ok(&self.class_rules(class, adduct)?.head_intensity_rules)
    }

    /// Same-chain and pairwise chain intensity rules
    fn chain_intensity_rules(&self, class: &str, adduct: &str) -> Result<&[IntensityRule], RuleError> {
        Ok(&self.class_rules(class, adduct)?.chain_intensity_rules)
    }

    /// Position intensity rules
    fn position_intensity_rules(
        &self,
        class: &str,
        adduct: &str,
    ) -> Result<&[IntensityRule], RuleError> {
        Ok(&self.class_rules(class, adduct)?.position_intensity_rules)
    }

    /// Relative chain-combination cutoff
    fn chain_cutoff(&self, class: &str, adduct: &str) -> Result<f64, RuleError> {
        Ok(self.class_rules(class, adduct)?.chain_cutoff)
    }

    /// Base peak cutoff
    fn base_peak_cutoff(&self, class: &str, adduct: &str) -> Result<f64, RuleError> {
        Ok(self.class_rules(class, adduct)?.base_peak_cutoff)
    }

    /// Minimum spectrum coverage
    fn spectrum_coverage_min(&self, class: &str, adduct: &str) -> Result<f64, RuleError> {
        Ok(self.class_rules(class, adduct)?.spectrum_coverage_min)
    }

    /// Number of chains per type
    fn chain_topology(&self, class: &str, adduct: &str) -> Result<ChainTopology, RuleError> {
        Ok(self.class_rules(class, adduct)?.topology)
    }

    /// Allowed backbone positions per chain type
    fn allowed_chain_positions(
        &self,
        class: &str,
        adduct: &str,
    ) -> Result<&BTreeMap<ChainType, BTreeSet<usize>>, RuleError> {
        Ok(&self.class_rules(class, adduct)?.allowed_positions)
    }

    /// Per-chain hydroxylation ranges as `(FA, LCB)`
    fn hydroxyl_ranges(
        &self,
        class: &str,
        adduct: &str,
    ) -> Result<(HydroxylRange, HydroxylRange), RuleError> {
        let rules = self.class_rules(class, adduct)?;
        Ok((rules.fa_hydroxyls, rules.lcb_hydroxyls))
    }
}

/// In-memory rule tables keyed by `class` or `class_adduct`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    classes: BTreeMap<String, ClassRules>,
}

impl RuleSet {
    /// Create an empty rule set
    pub fn new() -> Self {
        Self::default()
    }

    /// Register rules for a class; `key` is either `class` or `class_adduct`
    pub fn insert(&mut self, key: impl Into<String>, rules: ClassRules) {
        self.classes.insert(key.into(), rules);
    }

    /// Registered keys
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.classes.keys().map(String::as_str)
    }

    /// Validate every registered class
    pub fn validate(&self) -> Result<(), RuleError> {
        self.classes
            .iter()
            .try_for_each(|(key, rules)| rules.validate(key))
    }
}

impl RuleProvider for RuleSet {
    fn class_rules(&self, class: &str, adduct: &str) -> Result<&ClassRules, RuleError> {
        self.classes
            .get(&format!("{}_{}", class, adduct))
            .or_else(|| self.classes.get(class))
            .ok_or_else(|| RuleError::Absent {
                class: format!("{} {}", class, adduct),
            })
    }
}
