use std::collections::{BTreeMap, BTreeSet};

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use super::canonical::{canonical_name, unique_permutations, CanonicalSet};
use super::hydroxylation::{OhDistribution, OhSlot};
use super::radix::MixedRadix;
use crate::chains::{Chain, ChainId, ChainKey, ChainLibrary, ChainType, SlotKey};
use crate::chemistry::IsotopeLabel;

/// Everything the generator needs to decompose one analyte
#[derive(Debug, Clone, Copy)]
pub struct CombinationRequest<'a> {
    /// Total carbon atoms over all chains
    pub carbons: u32,
    /// Total double bonds over all chains
    pub double_bonds: u32,
    /// OH distributions produced by the hydroxylation partitioner
    pub distributions: &'a [OhDistribution],
    /// Acyl/alkyl/alkenyl candidates
    pub fatty_acids: &'a ChainLibrary,
    /// Long-chain-base candidates, when the class has any
    pub lcbs: Option<&'a ChainLibrary>,
    /// Isotope label budget the chains must use up exactly
    pub label: &'a IsotopeLabel,
    /// Oxidation states the chains must carry, as a multiset
    pub oxidations: &'a [String],
}

impl<'a> CombinationRequest<'a> {
    fn library(&self, chain_type: ChainType) -> Option<&'a ChainLibrary> {
        match chain_type {
            ChainType::Lcb => self.lcbs,
            _ => Some(self.fatty_acids),
        }
    }

    fn pooled_pairs(&self) -> BTreeSet<(u32, u32)> {
        let mut pairs = self.fatty_acids.carbon_double_bond_pairs();
        if let Some(lcbs) = self.lcbs {
            pairs.extend(lcbs.carbon_double_bond_pairs());
        }
        pairs
    }

    fn within_budget(&self, chains: &[&Chain]) -> bool {
        let mut label = IsotopeLabel::none();
        for chain in chains {
            label += chain.label();
        }
        if &label != self.label {
            return false;
        }
        let mut oxidations: Vec<&str> = chains.iter().filter_map(|c| c.oxidation()).collect();
        oxidations.sort_unstable();
        let mut budget: Vec<&str> = self.oxidations.iter().map(String::as_str).collect();
        budget.sort_unstable();
        oxidations == budget
    }
}

/// A concrete decomposition of the analyte into chains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainCombination {
    id: String,
    distribution: String,
    chains: Vec<Chain>,
}

impl ChainCombination {
    /// Create a combination; its id is the sorted chain ids joined by `_`
    pub fn new(chains: Vec<Chain>, distribution: impl Into<String>) -> Self {
        let keys: Vec<ChainKey> = chains.iter().map(|c| c.key().clone()).collect();
        Self {
            id: canonical_name(&keys),
            distribution: distribution.into(),
            chains,
        }
    }

    /// Canonical identifier, e.g. `16:0_18:1`
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Identifier of the OH distribution this combination was built from
    pub fn distribution(&self) -> &str {
        &self.distribution
    }

    /// Chains in slot order
    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    /// Number of chains
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Whether the combination has no chains
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Chain ids in slot order
    pub fn chain_ids(&self) -> impl Iterator<Item = &ChainId> + '_ {
        self.chains.iter().map(Chain::id)
    }

    /// Whether the combination contains `chain`
    pub fn contains(&self, chain: &ChainId) -> bool {
        self.chain_ids().any(|id| id == chain)
    }

    /// Whether every chain is the same
    pub fn is_homogeneous(&self) -> bool {
        self.chains.windows(2).all(|w| w[0].key() == w[1].key())
    }

    /// Total carbon atoms
    pub fn carbons(&self) -> u32 {
        self.chains.iter().map(Chain::carbons).sum()
    }

    /// Total double bonds
    pub fn double_bonds(&self) -> u32 {
        self.chains.iter().map(Chain::double_bonds).sum()
    }

    /// Total hydroxylation sites
    pub fn hydroxyls(&self) -> u32 {
        self.chains.iter().map(Chain::hydroxyls).sum()
    }
}

/// Result of the generator: every valid combination grouped by OH distribution,
/// plus the flattened set of chains they use
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PotentialCombinations {
    by_distribution: BTreeMap<String, Vec<ChainCombination>>,
    unique_chains: BTreeMap<ChainId, Chain>,
}

impl PotentialCombinations {
    /// Combinations grouped by OH distribution id, each group in generation order
    pub fn by_distribution(&self) -> &BTreeMap<String, Vec<ChainCombination>> {
        &self.by_distribution
    }

    /// Every combination
    pub fn combinations(&self) -> impl Iterator<Item = &ChainCombination> + '_ {
        self.by_distribution.values().flatten()
    }

    /// Combination by canonical id
    pub fn get(&self, id: &str) -> Option<&ChainCombination> {
        self.combinations().find(|c| c.id() == id)
    }

    /// Number of combinations
    pub fn len(&self) -> usize {
        self.by_distribution.values().map(Vec::len).sum()
    }

    /// Whether no combination survived
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every chain referenced by any combination
    pub fn unique_chains(&self) -> &BTreeMap<ChainId, Chain> {
        &self.unique_chains
    }

    /// Chain by id
    pub fn chain(&self, id: &ChainId) -> Option<&Chain> {
        self.unique_chains.get(id)
    }

    fn push(&mut self, combination: ChainCombination) {
        for chain in combination.chains() {
            self.unique_chains
                .entry(chain.id().clone())
                .or_insert_with(|| chain.clone());
        }
        self.by_distribution
            .entry(combination.distribution().to_string())
            .or_default()
            .push(combination);
    }
}

/// Every non-decreasing assignment of candidate carbon counts to `slots` slots summing to `total`
pub fn carbon_partitions(total: u32, slots: usize, candidates: &BTreeSet<u32>) -> Vec<Vec<u32>> {
    let candidates: Vec<u32> = candidates.iter().copied().collect();
    let mut result = Vec::new();
    if slots == 0 {
        return result;
    }
    let mut current = Vec::with_capacity(slots);
    collect_carbons(&candidates, 0, total, slots, &mut current, &mut result);
    result
}

fn collect_carbons(
    candidates: &[u32],
    start: usize,
    remaining: u32,
    slots_left: usize,
    current: &mut Vec<u32>,
    result: &mut Vec<Vec<u32>>,
) {
    if slots_left == 0 {
        if remaining == 0 {
            result.push(current.clone());
        }
        return;
    }
    let Some(&largest) = candidates.last() else {
        return;
    };
    for (index, &carbons) in candidates.iter().enumerate().skip(start) {
        // later slots take at least `carbons`
        if carbons.saturating_mul(slots_left as u32) > remaining {
            break;
        }
        if remaining - carbons > largest.saturating_mul(slots_left as u32 - 1) {
            continue;
        }
        current.push(carbons);
        collect_carbons(candidates, index, remaining - carbons, slots_left - 1, current, result);
        current.pop();
    }
}

/// Every per-slot assignment of double bonds to `carbons` summing to `total`.
///
/// `options` maps a carbon count to the double-bond counts the libraries offer for it;
/// slots re-iterate their full option list since double bonds pair with carbons per slot.
pub fn double_bond_assignments(
    total: u32,
    carbons: &[u32],
    options: &BTreeMap<u32, Vec<u32>>,
) -> Vec<Vec<u32>> {
    let mut result = Vec::new();
    let mut current = Vec::with_capacity(carbons.len());
    collect_double_bonds(total, carbons, options, &mut current, &mut result);
    result
}

fn collect_double_bonds(
    remaining: u32,
    carbons: &[u32],
    options: &BTreeMap<u32, Vec<u32>>,
    current: &mut Vec<u32>,
    result: &mut Vec<Vec<u32>>,
) {
    let Some((first, rest)) = carbons.split_first() else {
        if remaining == 0 {
            result.push(current.clone());
        }
        return;
    };
    let Some(slot_options) = options.get(first) else {
        return;
    };
    if slot_options.as_slice() == [0] {
        current.push(0);
        collect_double_bonds(remaining, rest, options, current, result);
        current.pop();
        return;
    }
    for &double_bonds in slot_options {
        if double_bonds > remaining {
            break;
        }
        current.push(double_bonds);
        collect_double_bonds(remaining - double_bonds, rest, options, current, result);
        current.pop();
    }
}

/// Permutation-free `(carbons, double bonds)` combinations over `slots` slots drawn from
/// the pooled library pairs and summing to the analyte totals
pub fn carbon_double_bond_combinations(
    carbons: u32,
    double_bonds: u32,
    slots: usize,
    pooled: &BTreeSet<(u32, u32)>,
) -> Vec<Vec<(u32, u32)>> {
    let mut options: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
    for (c, db) in pooled {
        options.entry(*c).or_default().push(*db);
    }
    let candidates: BTreeSet<u32> = options.keys().copied().collect();

    let mut seen = CanonicalSet::new();
    let mut result = Vec::new();
    for carbon_slots in carbon_partitions(carbons, slots, &candidates) {
        for db_slots in double_bond_assignments(double_bonds, &carbon_slots, &options) {
            let pairs: Vec<(u32, u32)> = carbon_slots.iter().copied().zip(db_slots).collect();
            if seen.insert(&pairs) {
                result.push(pairs);
            }
        }
    }
    result
}

/// Output of the label permutation step
#[derive(Debug, Clone, Default)]
pub struct LabelPermutations<'a> {
    /// Size of the Cartesian product before deduplication
    pub raw_candidates: usize,
    /// Permutation-free chain choices in generation order
    pub choices: Vec<Vec<&'a Chain>>,
}

/// Enumerate the Cartesian product of per-slot chain variants through a mixed-radix
/// index and drop label-permutation-equivalent choices
pub fn label_permutations<'a>(options: &[Vec<&'a Chain>]) -> LabelPermutations<'a> {
    let counts: Vec<usize> = options.iter().map(Vec::len).collect();
    let radix = MixedRadix::new(&counts);
    let mut seen = CanonicalSet::new();
    let mut choices = Vec::new();
    for index in 0..radix.total() {
        let chains: Vec<&Chain> = options
            .iter()
            .enumerate()
            .map(|(slot, variants)| variants[radix.choice(index, slot)])
            .collect();
        let keys: Vec<ChainKey> = chains.iter().map(|c| c.key().clone()).collect();
        if seen.insert(&keys) {
            choices.push(chains);
        }
    }
    LabelPermutations {
        raw_candidates: radix.total(),
        choices,
    }
}

/// Enumerate every chain combination consistent with the request
pub fn generate(request: &CombinationRequest<'_>) -> PotentialCombinations {
    let pooled = request.pooled_pairs();
    let mut backbones: BTreeMap<usize, Vec<Vec<(u32, u32)>>> = BTreeMap::new();
    let mut result = PotentialCombinations::default();

    for distribution in request.distributions {
        let slots = distribution.slots().len();
        let backbone = backbones.entry(slots).or_insert_with(|| {
            carbon_double_bond_combinations(request.carbons, request.double_bonds, slots, &pooled)
        });
        let id = distribution.id();
        let bindings = unique_permutations(distribution.slots());
        let mut seen = CanonicalSet::new();
        let mut kept = 0usize;

        for pairs in backbone.iter() {
            for binding in &bindings {
                let Some(options) = bind_slots(request, binding, pairs) else {
                    continue;
                };
                let permutations = label_permutations(&options);
                trace!(
                    "{}: {} label candidate(s) for {:?}",
                    id,
                    permutations.raw_candidates,
                    pairs
                );
                for chains in permutations.choices {
                    if !request.within_budget(&chains) {
                        continue;
                    }
                    let keys: Vec<ChainKey> = chains.iter().map(|c| c.key().clone()).collect();
                    if !seen.insert(&keys) {
                        continue;
                    }
                    let owned = chains.into_iter().cloned().collect();
                    result.push(ChainCombination::new(owned, id.clone()));
                    kept += 1;
                }
            }
        }
        debug!(
            "OH distribution {}: {} backbone(s), {} combination(s)",
            id,
            backbone.len(),
            kept
        );
    }
    result
}

fn bind_slots<'a>(
    request: &CombinationRequest<'a>,
    binding: &[OhSlot],
    pairs: &[(u32, u32)],
) -> Option<Vec<Vec<&'a Chain>>> {
    binding
        .iter()
        .zip(pairs)
        .map(|(slot, (carbons, double_bonds))| {
            let library = request.library(slot.chain_type)?;
            let variants = library.variants(&SlotKey {
                chain_type: slot.chain_type,
                carbons: *carbons,
                double_bonds: *double_bonds,
                hydroxyls: slot.hydroxyls,
            });
            (!variants.is_empty()).then_some(variants)
        })
        .collect()
}
