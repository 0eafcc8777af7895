//! # Rules Module
//!
//! Class-specific fragmentation and intensity rules, and the [`RuleProvider`] seam the
//! analysis reads them through.
//!
//! Rules are loaded by an external collaborator and are immutable afterwards. The
//! in-memory [`RuleSet`] deserializes them from JSON:
//!
//! ```json
//! {
//!   "PC": {
//!     "topology": { "acyl": 2 },
//!     "head_fragments": [
//!       { "name": "HG(PC,184)", "target": "head", "formula": "C5H15NO4P",
//!         "mandatory": "always" }
//!     ],
//!     "chain_fragments": [
//!       { "name": "FA-H", "target": { "chain": "acyl" }, "formula": "$CHAIN-H",
//!         "charge": -1 }
//!     ]
//!   }
//! }
//! ```

mod error;
mod expression;
mod provider;

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::chains::ChainType;
use crate::combinatorics::{ChainTopology, HydroxylRange};

pub use error::{ExpressionError, RuleError};
pub use expression::FormulaExpression;
pub use provider::{RuleProvider, RuleSet};

/// What a fragment rule is computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentTarget {
    /// The head group (precursor-derived fragment)
    Head,
    /// A chain of the given type
    Chain(ChainType),
}

/// How strongly a fragment is required
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MandatoryPolicy {
    /// Must be present for the owner to be accepted
    Always,
    /// Must be present when quantification is enabled
    Quant,
    /// Evidence that the owner belongs to this class; checked by the coverage gate
    Class,
    /// Contributes evidence only
    #[default]
    Optional,
}

/// Theoretical fragment definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentRule {
    /// Fragment name, unique within its class
    pub name: String,
    /// Head group or chain type
    pub target: FragmentTarget,
    /// Fragment formula
    pub formula: FormulaExpression,
    /// Ion charge
    #[serde(default = "default_charge")]
    pub charge: i32,
    /// MS level the fragment is observed at
    #[serde(default = "default_ms_level")]
    pub ms_level: u8,
    /// Mandatory policy when no hydroxyl-specific override applies
    #[serde(default)]
    pub mandatory: MandatoryPolicy,
    /// Per-hydroxylation-count overrides of `mandatory`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub mandatory_by_hydroxyls: BTreeMap<u32, MandatoryPolicy>,
    /// Hydroxylation counts the rule applies to; all when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_hydroxyls: Option<BTreeSet<u32>>,
}

fn default_charge() -> i32 {
    1
}

fn default_ms_level() -> u8 {
    2
}

impl FragmentRule {
    /// Mandatory policy at `hydroxyls` hydroxylation sites
    pub fn policy_for(&self, hydroxyls: u32) -> MandatoryPolicy {
        self.mandatory_by_hydroxyls
            .get(&hydroxyls)
            .copied()
            .unwrap_or(self.mandatory)
    }

    /// Whether the rule applies at `hydroxyls` hydroxylation sites
    pub fn is_valid_for(&self, hydroxyls: u32) -> bool {
        self.valid_hydroxyls
            .as_ref()
            .map_or(true, |valid| valid.contains(&hydroxyls))
    }

    /// Whether the rule targets chains of `chain_type`
    pub fn targets(&self, chain_type: ChainType) -> bool {
        self.target == FragmentTarget::Chain(chain_type)
    }
}

/// Owner of the fragment an intensity rule term refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum FragmentSource {
    /// A head-group fragment
    Head,
    /// A chain fragment; `position` is the backbone position for position rules
    Chain {
        /// Chain type the fragment belongs to
        chain_type: ChainType,
        /// 1-based backbone position
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<usize>,
    },
    /// The base peak intensity at the fragment's MS level
    BasePeak,
}

/// One side of an intensity comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentTerm {
    /// Fragment owner
    #[serde(flatten)]
    pub source: FragmentSource,
    /// Fragment name; unused by base peak terms, which take the MS level of the opposite term
    #[serde(default)]
    pub fragment: String,
    /// Multiplier applied to the area
    #[serde(default = "default_factor")]
    pub factor: f64,
}

fn default_factor() -> f64 {
    1.0
}

impl FragmentTerm {
    /// Backbone position of a chain term
    pub fn position(&self) -> Option<usize> {
        match self.source {
            FragmentSource::Chain { position, .. } => position,
            _ => None,
        }
    }

    /// Chain type of a chain term
    pub fn chain_type(&self) -> Option<ChainType> {
        match self.source {
            FragmentSource::Chain { chain_type, .. } => Some(chain_type),
            _ => None,
        }
    }
}

/// How fragment areas are compared
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMode {
    /// Raw areas
    #[default]
    Absolute,
    /// Areas divided by the total found area of their owner
    Relative,
}

/// Which owners an intensity rule spans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleScope {
    /// Head-group fragments (optionally against the base peak)
    Head,
    /// Fragments of a single chain
    SameChain,
    /// Fragments of two different chains
    Pairwise,
}

/// Comparison between two fragment areas: fulfilled when
/// `bigger.factor * area(bigger) > smaller.factor * area(smaller)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityRule {
    /// Rule name
    pub name: String,
    /// Term expected to be larger
    pub bigger: FragmentTerm,
    /// Term expected to be smaller
    pub smaller: FragmentTerm,
    /// Whether a failure rejects the owner
    #[serde(default)]
    pub mandatory: bool,
    /// Absolute or relative comparison
    #[serde(default)]
    pub mode: ComparisonMode,
}

impl IntensityRule {
    /// Scope derived from the term sources
    pub fn scope(&self) -> RuleScope {
        let terms = [&self.bigger, &self.smaller];
        if terms.iter().any(|t| t.source == FragmentSource::Head) {
            return RuleScope::Head;
        }
        match (&self.bigger.source, &self.smaller.source) {
            (FragmentSource::Chain { .. }, FragmentSource::Chain { .. })
                if self.bigger.position() != self.smaller.position() =>
            {
                RuleScope::Pairwise
            }
            _ => RuleScope::SameChain,
        }
    }

    /// Both terms
    pub fn terms(&self) -> [&FragmentTerm; 2] {
        [&self.bigger, &self.smaller]
    }

    /// Chain positions referenced by the rule, sorted and deduplicated
    pub fn positions(&self) -> Vec<usize> {
        let mut positions: Vec<usize> = self.terms().iter().filter_map(|t| t.position()).collect();
        positions.sort_unstable();
        positions.dedup();
        positions
    }

    /// Identifier of the positions the rule discriminates, e.g. `1` or `1-2`
    pub fn position_pair_id(&self) -> String {
        self.positions()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl fmt::Display for IntensityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}*{} > {}*{}",
            self.name,
            self.bigger.factor,
            self.bigger.fragment,
            self.smaller.factor,
            self.smaller.fragment
        )
    }
}

/// Every rule and parameter of one lipid class (and optionally adduct)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassRules {
    /// Chains of every type the class carries
    #[serde(default)]
    pub topology: ChainTopology,
    /// Backbone positions each chain type may occupy (1-based); all when absent
    #[serde(default)]
    pub allowed_positions: BTreeMap<ChainType, BTreeSet<usize>>,
    /// Per-chain hydroxylation range for FA-type chains
    #[serde(default)]
    pub fa_hydroxyls: HydroxylRange,
    /// Per-chain hydroxylation range for long-chain bases
    #[serde(default)]
    pub lcb_hydroxyls: HydroxylRange,
    /// Name of the FA chain library
    #[serde(default = "default_fa_library")]
    pub fa_library: String,
    /// Name of the LCB chain library, for sphingolipid classes
    #[serde(default)]
    pub lcb_library: Option<String>,
    /// Head-group fragments
    #[serde(default)]
    pub head_fragments: Vec<FragmentRule>,
    /// Chain fragments
    #[serde(default)]
    pub chain_fragments: Vec<FragmentRule>,
    /// Intensity rules between head-group fragments
    #[serde(default)]
    pub head_intensity_rules: Vec<IntensityRule>,
    /// Intensity rules within or between chains
    #[serde(default)]
    pub chain_intensity_rules: Vec<IntensityRule>,
    /// Intensity rules resolving backbone positions
    #[serde(default)]
    pub position_intensity_rules: Vec<IntensityRule>,
    /// Relative aggregate-area cutoff for chain combinations (fraction of the maximum)
    #[serde(default)]
    pub chain_cutoff: f64,
    /// Minimum fragment area as a fraction of the base peak at its MS level
    #[serde(default)]
    pub base_peak_cutoff: f64,
    /// Minimum fraction of the spectrum intensity the found fragments must explain
    #[serde(default)]
    pub spectrum_coverage_min: f64,
}

fn default_fa_library() -> String {
    "FA".to_string()
}

impl Default for ClassRules {
    fn default() -> Self {
        Self {
            topology: ChainTopology::default(),
            allowed_positions: BTreeMap::new(),
            fa_hydroxyls: HydroxylRange::default(),
            lcb_hydroxyls: HydroxylRange::default(),
            fa_library: default_fa_library(),
            lcb_library: None,
            head_fragments: Vec::new(),
            chain_fragments: Vec::new(),
            head_intensity_rules: Vec::new(),
            chain_intensity_rules: Vec::new(),
            position_intensity_rules: Vec::new(),
            chain_cutoff: 0.0,
            base_peak_cutoff: 0.0,
            spectrum_coverage_min: 0.0,
        }
    }
}

impl ClassRules {
    /// Head fragment rule by name
    pub fn head_fragment(&self, name: &str) -> Option<&FragmentRule> {
        self.head_fragments.iter().find(|r| r.name == name)
    }

    /// Chain fragment rule by name
    pub fn chain_fragment(&self, name: &str) -> Option<&FragmentRule> {
        self.chain_fragments.iter().find(|r| r.name == name)
    }

    /// Positions chains of `chain_type` may occupy among `1..=slots`
    pub fn positions_for(&self, chain_type: ChainType, slots: usize) -> BTreeSet<usize> {
        match self.allowed_positions.get(&chain_type) {
            Some(allowed) => allowed.iter().copied().filter(|p| (1..=slots).contains(p)).collect(),
            None => (1..=slots).collect(),
        }
    }

    /// Whether chains can be told apart by backbone position
    pub fn has_multiple_positions(&self) -> bool {
        let slots = self.topology.total();
        let positions: BTreeSet<usize> = ChainType::ALL
            .into_iter()
            .filter(|t| self.topology.count(*t) > 0)
            .flat_map(|t| self.positions_for(t, slots))
            .collect();
        positions.len() > 1
    }

    /// Check the structural consistency of every rule
    pub fn validate(&self, class: &str) -> Result<(), RuleError> {
        let fail = |rule: &str, reason: &str| Err(RuleError::violation(class, rule, reason));

        for (field, value) in [
            ("chain_cutoff", self.chain_cutoff),
            ("base_peak_cutoff", self.base_peak_cutoff),
            ("spectrum_coverage_min", self.spectrum_coverage_min),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return fail(field, &format!("{} is outside [0, 1]", value));
            }
        }
        for range in [self.fa_hydroxyls, self.lcb_hydroxyls] {
            if range.min > range.max {
                return fail("hydroxyls", &format!("empty range {}", range));
            }
        }
        if self.topology.lcb > 0 && self.lcb_library.is_none() {
            return fail("lcb_library", "class has LCB chains but no LCB library");
        }

        let mut names = BTreeSet::new();
        for rule in self.head_fragments.iter().chain(&self.chain_fragments) {
            if !names.insert(rule.name.as_str()) {
                return fail(&rule.name, "duplicate fragment name");
            }
            if rule.charge == 0 {
                return fail(&rule.name, "charge must not be zero");
            }
            if rule.ms_level < 2 {
                return fail(&rule.name, &format!("MS{} is not an MSn level", rule.ms_level));
            }
        }
        for rule in &self.head_fragments {
            if rule.target != FragmentTarget::Head || rule.formula.uses_chain() {
                return fail(&rule.name, "head fragment must not reference a chain");
            }
        }
        for rule in &self.chain_fragments {
            if rule.target == FragmentTarget::Head {
                return fail(&rule.name, "chain fragment must target a chain type");
            }
        }

        for rule in &self.head_intensity_rules {
            self.validate_intensity_rule(class, rule)?;
            if rule.scope() != RuleScope::Head {
                return fail(&rule.name, "head intensity rule references a chain");
            }
        }
        for rule in &self.chain_intensity_rules {
            self.validate_intensity_rule(class, rule)?;
            if rule.scope() == RuleScope::Head {
                return fail(&rule.name, "chain intensity rule references the head group");
            }
        }
        for rule in &self.position_intensity_rules {
            self.validate_intensity_rule(class, rule)?;
            let positioned = rule
                .terms()
                .iter()
                .filter(|t| t.chain_type().is_some())
                .all(|t| t.position().is_some());
            if rule.scope() == RuleScope::Head || !positioned {
                return fail(&rule.name, "position rule terms need chain positions");
            }
            let slots = self.topology.total();
            if rule.positions().iter().any(|p| *p == 0 || *p > slots) {
                return fail(&rule.name, "position outside the backbone");
            }
        }
        Ok(())
    }

    fn validate_intensity_rule(&self, class: &str, rule: &IntensityRule) -> Result<(), RuleError> {
        let fail = |reason: String| Err(RuleError::violation(class, &rule.name, reason));

        for term in rule.terms() {
            if !term.factor.is_finite() || term.factor <= 0.0 {
                return fail(format!("invalid factor {}", term.factor));
            }
            let known = match term.source {
                FragmentSource::Head => self.head_fragment(&term.fragment).is_some(),
                FragmentSource::Chain { chain_type, .. } => self
                    .chain_fragment(&term.fragment)
                    .is_some_and(|r| r.targets(chain_type)),
                FragmentSource::BasePeak => {
                    if rule.mode == ComparisonMode::Relative {
                        return fail("base peak cannot be compared in relative mode".to_string());
                    }
                    true
                }
            };
            if !known {
                return fail(format!("unknown fragment '{}'", term.fragment));
            }
        }
        if rule.terms().iter().all(|t| t.source == FragmentSource::BasePeak) {
            return fail("compares the base peak with itself".to_string());
        }
        Ok(())
    }
}
