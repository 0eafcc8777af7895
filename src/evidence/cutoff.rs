use std::collections::{BTreeMap, HashMap};

use log::trace;
use serde::{Deserialize, Serialize};

use crate::chains::ChainId;
use crate::combinatorics::ChainCombination;

/// A combination dropped by the relative chain cutoff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutoffRemoval {
    /// Combination id
    pub combination: String,
    /// Its aggregate area in the pass it was removed
    pub aggregate: f64,
    /// Threshold of that pass
    pub threshold: f64,
}

/// Result of running the cutoff to its fixed point
#[derive(Debug, Clone)]
pub struct CutoffOutcome<'a> {
    /// Surviving combinations, input order preserved
    pub retained: Vec<&'a ChainCombination>,
    /// Removed combinations in removal order
    pub removed: Vec<CutoffRemoval>,
    /// Number of passes, including the final one that removed nothing
    pub passes: usize,
}

/// Aggregate area of every combination.
///
/// Each member chain (with multiplicity) contributes its area divided by the number of
/// combinations in `combinations` that contain it, so shared evidence is not counted twice.
pub fn aggregate_areas(
    combinations: &[&ChainCombination],
    chain_areas: &BTreeMap<ChainId, f64>,
) -> Vec<f64> {
    let mut occurrences: HashMap<&ChainId, usize> = HashMap::new();
    for combination in combinations {
        let mut ids: Vec<&ChainId> = combination.chain_ids().collect();
        ids.sort();
        ids.dedup();
        for id in ids {
            *occurrences.entry(id).or_default() += 1;
        }
    }

    combinations
        .iter()
        .map(|combination| {
            combination
                .chain_ids()
                .map(|id| {
                    let area = chain_areas.get(id).copied().unwrap_or(0.0);
                    let count = occurrences.get(id).copied().unwrap_or(1).max(1);
                    area / count as f64
                })
                .sum()
        })
        .collect()
}

/// Drop combinations whose aggregate area is below `cutoff` times the largest aggregate,
/// repeating until a pass removes nothing
pub fn apply_chain_cutoff<'a>(
    combinations: Vec<&'a ChainCombination>,
    chain_areas: &BTreeMap<ChainId, f64>,
    cutoff: f64,
) -> CutoffOutcome<'a> {
    let mut retained = combinations;
    let mut removed = Vec::new();
    let mut passes = 0;

    let mut changed = true;
    while changed {
        changed = false;
        passes += 1;

        let aggregates = aggregate_areas(&retained, chain_areas);
        let max = aggregates.iter().copied().fold(0.0, f64::max);
        let threshold = cutoff * max;

        let mut kept = Vec::with_capacity(retained.len());
        for (combination, aggregate) in retained.into_iter().zip(aggregates) {
            if aggregate < threshold {
                trace!(
                    "Cutoff pass {}: {} at {:.3e} < {:.3e}",
                    passes,
                    combination.id(),
                    aggregate,
                    threshold
                );
                removed.push(CutoffRemoval {
                    combination: combination.id().to_string(),
                    aggregate,
                    threshold,
                });
                changed = true;
            } else {
                kept.push(combination);
            }
        }
        retained = kept;
    }

    CutoffOutcome {
        retained,
        removed,
        passes,
    }
}
