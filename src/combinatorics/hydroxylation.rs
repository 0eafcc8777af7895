use std::fmt;

use serde::{Deserialize, Serialize};

use super::canonical::{sub_multisets, CanonicalSet};
use super::radix::MixedRadix;
use super::CombinatoricsError;
use crate::chains::ChainType;

/// Inclusive per-chain range of hydroxylation sites
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HydroxylRange {
    /// Minimum sites per chain
    pub min: u32,
    /// Maximum sites per chain
    pub max: u32,
}

impl HydroxylRange {
    /// Range from `min` to `max` inclusive
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// A single allowed value
    pub fn fixed(value: u32) -> Self {
        Self::new(value, value)
    }

    /// Whether `value` lies inside the range
    pub fn contains(&self, value: u32) -> bool {
        self.min <= value && value <= self.max
    }

    /// Whether `chains` chains, each inside this range, can carry `total` sites
    pub fn admits_total(&self, total: u32, chains: usize) -> bool {
        let chains = u64::try_from(chains).unwrap_or(u64::MAX);
        let total = u64::from(total);
        chains.saturating_mul(u64::from(self.min)) <= total
            && total <= chains.saturating_mul(u64::from(self.max))
    }
}

impl fmt::Display for HydroxylRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// Number of chains of every type a lipid class carries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainTopology {
    /// Acyl chains
    #[serde(default)]
    pub acyl: usize,
    /// Alkyl chains
    #[serde(default)]
    pub alkyl: usize,
    /// Alkenyl chains
    #[serde(default)]
    pub alkenyl: usize,
    /// Long-chain bases
    #[serde(default)]
    pub lcb: usize,
}

impl ChainTopology {
    /// Topology with only acyl chains
    pub fn acyl(chains: usize) -> Self {
        Self {
            acyl: chains,
            ..Default::default()
        }
    }

    /// Number of chains of `chain_type`
    pub fn count(&self, chain_type: ChainType) -> usize {
        match chain_type {
            ChainType::Acyl => self.acyl,
            ChainType::Alkyl => self.alkyl,
            ChainType::Alkenyl => self.alkenyl,
            ChainType::Lcb => self.lcb,
        }
    }

    /// Number of FA-type chains (acyl + alkyl + alkenyl)
    pub fn fatty_acid_chains(&self) -> usize {
        self.acyl + self.alkyl + self.alkenyl
    }

    /// Total number of chains
    pub fn total(&self) -> usize {
        self.fatty_acid_chains() + self.lcb
    }
}

/// One chain of an OH distribution: its type and hydroxylation count
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OhSlot {
    /// Chain type
    pub chain_type: ChainType,
    /// Hydroxylation sites on this chain
    pub hydroxyls: u32,
}

/// A complete assignment of hydroxylation counts to typed chains, held in canonical order
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OhDistribution {
    slots: Vec<OhSlot>,
}

impl OhDistribution {
    /// Create a distribution; slot order is normalised
    pub fn new(mut slots: Vec<OhSlot>) -> Self {
        slots.sort();
        Self { slots }
    }

    /// Slots in canonical order
    pub fn slots(&self) -> &[OhSlot] {
        &self.slots
    }

    /// Total hydroxylation sites
    pub fn total_hydroxyls(&self) -> u32 {
        self.slots.iter().map(|s| s.hydroxyls).sum()
    }

    /// Identifier of the form `acyl:0x1;lcb:2x1` (`type:hydroxyls x count`)
    pub fn id(&self) -> String {
        let mut groups: Vec<(OhSlot, usize)> = Vec::new();
        for slot in &self.slots {
            match groups.last_mut() {
                Some((last, count)) if last == slot => *count += 1,
                _ => groups.push((*slot, 1)),
            }
        }
        groups
            .iter()
            .map(|(slot, count)| format!("{}:{}x{}", slot.chain_type, slot.hydroxyls, count))
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl fmt::Display for OhDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id())
    }
}

/// All `(FA sites, LCB sites)` pairs summing to `total` that both sides can carry
pub fn split_hydroxylation(
    total: u32,
    fa_chains: usize,
    lcb_chains: usize,
    fa_range: HydroxylRange,
    lcb_range: HydroxylRange,
) -> Vec<(u32, u32)> {
    (0..=total)
        .map(|fa| (fa, total - fa))
        .filter(|(fa, lcb)| {
            fa_range.admits_total(*fa, fa_chains) && lcb_range.admits_total(*lcb, lcb_chains)
        })
        .collect()
}

/// Every multiset of `chains` per-chain counts inside `range` summing to `total`,
/// each returned in non-decreasing order
pub fn per_chain_distributions(total: u32, chains: usize, range: HydroxylRange) -> Vec<Vec<u32>> {
    let mut result = Vec::new();
    let mut current = Vec::with_capacity(chains);
    distribute(total, chains, range.min, range.max, &mut current, &mut result);
    result
}

fn distribute(
    remaining: u32,
    slots_left: usize,
    lowest: u32,
    highest: u32,
    current: &mut Vec<u32>,
    result: &mut Vec<Vec<u32>>,
) {
    if slots_left == 0 {
        if remaining == 0 {
            result.push(current.clone());
        }
        return;
    }
    let slots = u32::try_from(slots_left).unwrap_or(u32::MAX);
    for value in lowest..=highest {
        // non-decreasing order: every later slot takes at least `value`
        if value.saturating_mul(slots) > remaining {
            break;
        }
        if remaining - value > highest.saturating_mul(slots - 1) {
            continue;
        }
        current.push(value);
        distribute(remaining - value, slots_left - 1, value, highest, current, result);
        current.pop();
    }
}

/// Distribute FA-side per-chain counts over the acyl/alkyl/alkenyl sub-types.
///
/// Every sub-type draws a permutation-free sub-multiset of the parent values; the
/// cross-product over sub-types is kept only where the flattened histogram matches the
/// parent exactly.
pub fn distribute_fatty_acid_subtypes(values: &[u32], topology: &ChainTopology) -> Vec<Vec<OhSlot>> {
    let mut parent = values.to_vec();
    parent.sort();

    let subtypes: Vec<(ChainType, Vec<Vec<u32>>)> = ChainType::FATTY_ACID_TYPES
        .iter()
        .filter(|t| topology.count(**t) > 0)
        .map(|t| (*t, sub_multisets(values, topology.count(*t))))
        .collect();

    let counts: Vec<usize> = subtypes.iter().map(|(_, options)| options.len()).collect();
    let radix = MixedRadix::new(&counts);

    let mut seen = CanonicalSet::new();
    let mut result = Vec::new();
    for choices in radix.iter() {
        let mut slots = Vec::with_capacity(values.len());
        let mut flattened = Vec::with_capacity(values.len());
        for ((chain_type, options), choice) in subtypes.iter().zip(&choices) {
            for hydroxyls in &options[*choice] {
                slots.push(OhSlot {
                    chain_type: *chain_type,
                    hydroxyls: *hydroxyls,
                });
                flattened.push(*hydroxyls);
            }
        }
        flattened.sort();
        if flattened == parent && seen.insert(&slots) {
            result.push(slots);
        }
    }
    result
}

/// Partition `total` hydroxylation sites over the chains of `topology`.
///
/// Fails only when no `(FA, LCB)` split is achievable within the per-chain ranges; that
/// rejects the analyte outright.
pub fn partition_hydroxylation(
    total: u32,
    topology: &ChainTopology,
    fa_range: HydroxylRange,
    lcb_range: HydroxylRange,
) -> Result<Vec<OhDistribution>, CombinatoricsError> {
    let fa_chains = topology.fatty_acid_chains();
    let lcb_chains = topology.lcb;

    let splits = split_hydroxylation(total, fa_chains, lcb_chains, fa_range, lcb_range);
    if splits.is_empty() {
        return Err(CombinatoricsError::ConstraintUnsatisfiable {
            requested: total,
            fa_chains,
            lcb_chains,
            fa_range,
            lcb_range,
        });
    }

    let mut distributions: Vec<OhDistribution> = Vec::new();
    for (fa_total, lcb_total) in splits {
        let lcb_options = per_chain_distributions(lcb_total, lcb_chains, lcb_range);
        for fa_values in per_chain_distributions(fa_total, fa_chains, fa_range) {
            for fa_slots in distribute_fatty_acid_subtypes(&fa_values, topology) {
                for lcb_values in &lcb_options {
                    let mut slots = fa_slots.clone();
                    slots.extend(lcb_values.iter().map(|hydroxyls| OhSlot {
                        chain_type: ChainType::Lcb,
                        hydroxyls: *hydroxyls,
                    }));
                    let distribution = OhDistribution::new(slots);
                    if !distributions.contains(&distribution) {
                        distributions.push(distribution);
                    }
                }
            }
        }
    }
    Ok(distributions)
}
