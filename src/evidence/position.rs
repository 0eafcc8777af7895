//! Backbone position resolution.
//!
//! Fulfilled position rules become [`PositionVote`]s grouped by the positions they
//! discriminate. [`recommend`] turns each group into candidates: mandatory votes are
//! binding unless they disagree, optional votes need a strict majority. [`assign_positions`]
//! then fills the backbone greedily and never retracts an assignment.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::diagnostics::Reason;
use crate::chains::ChainId;

/// One position recommendation from a fulfilled rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionVote {
    /// Positions the rule discriminates, e.g. `1-2`
    pub group: String,
    /// Recommended chain
    pub chain: ChainId,
    /// Recommended 1-based position
    pub position: usize,
    /// Rule that produced the vote
    pub rule: String,
    /// Whether the rule is mandatory
    pub mandatory: bool,
}

/// Aggregated recommendation for placing `chain` at `position`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Chain id
    pub chain: ChainId,
    /// 1-based position
    pub position: usize,
    /// Backed by a mandatory rule
    pub binding: bool,
    /// Number of supporting rules
    pub support: usize,
    /// Names of the supporting rules
    pub rules: Vec<String>,
}

impl Candidate {
    fn key(&self) -> (bool, usize) {
        (self.binding, self.support)
    }
}

/// A position group that produced no recommendation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    /// Group id, with `@position` for per-position ties
    pub group: String,
    /// Why it stayed unresolved
    pub reason: Reason,
}

/// Candidates derived from all votes of one combination
#[derive(Debug, Clone, Default)]
pub struct Recommendations {
    /// Candidates sorted by chain and position
    pub candidates: Vec<Candidate>,
    /// Groups or positions left open
    pub unresolved: Vec<Unresolved>,
}

/// Turn votes into candidates, group by group
pub fn recommend(votes: &[PositionVote]) -> Recommendations {
    let mut groups: BTreeMap<&str, Vec<&PositionVote>> = BTreeMap::new();
    for vote in votes {
        groups.entry(vote.group.as_str()).or_default().push(vote);
    }

    let mut merged: BTreeMap<(ChainId, usize), Candidate> = BTreeMap::new();
    let mut unresolved = Vec::new();
    let mut add = |vote: &PositionVote, binding: bool| {
        let candidate = merged
            .entry((vote.chain.clone(), vote.position))
            .or_insert_with(|| Candidate {
                chain: vote.chain.clone(),
                position: vote.position,
                binding: false,
                support: 0,
                rules: Vec::new(),
            });
        candidate.binding |= binding;
        candidate.support += 1;
        candidate.rules.push(vote.rule.clone());
    };

    for (group, votes) in groups {
        let mandatory: Vec<&PositionVote> = votes.iter().copied().filter(|v| v.mandatory).collect();

        let mut chains_at: BTreeMap<usize, BTreeSet<&ChainId>> = BTreeMap::new();
        let mut positions_of: BTreeMap<&ChainId, BTreeSet<usize>> = BTreeMap::new();
        for vote in &mandatory {
            chains_at.entry(vote.position).or_default().insert(&vote.chain);
            positions_of.entry(&vote.chain).or_default().insert(vote.position);
        }
        let contradicting = chains_at.values().any(|c| c.len() > 1)
            || positions_of.values().any(|p| p.len() > 1);
        if contradicting {
            unresolved.push(Unresolved {
                group: group.to_string(),
                reason: Reason::ContradictingPositionRules,
            });
            continue;
        }
        for vote in &mandatory {
            add(vote, true);
        }

        // optional votes only decide positions and chains no mandatory rule settled
        let mut tallies: BTreeMap<usize, BTreeMap<&ChainId, Vec<&PositionVote>>> = BTreeMap::new();
        for vote in votes.iter().filter(|v| !v.mandatory) {
            if chains_at.contains_key(&vote.position) || positions_of.contains_key(&vote.chain) {
                continue;
            }
            tallies
                .entry(vote.position)
                .or_default()
                .entry(&vote.chain)
                .or_default()
                .push(vote);
        }
        for (position, by_chain) in tallies {
            let best = by_chain.values().map(Vec::len).max().unwrap_or(0);
            let mut leaders = by_chain.values().filter(|v| v.len() == best);
            match (leaders.next(), leaders.next()) {
                (Some(winner), None) => {
                    for vote in winner {
                        add(vote, false);
                    }
                }
                _ => unresolved.push(Unresolved {
                    group: format!("{}@{}", group, position),
                    reason: Reason::PositionTie,
                }),
            }
        }
    }

    Recommendations {
        candidates: merged.into_values().collect(),
        unresolved,
    }
}

/// One backbone slot of a combination to be placed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSpec {
    /// Chain occupying the slot
    pub chain: ChainId,
    /// Positions the chain's type may occupy
    pub allowed: BTreeSet<usize>,
}

struct Assignment<'s> {
    slots: &'s [SlotSpec],
    positions: Vec<Option<usize>>,
    taken: BTreeSet<usize>,
}

impl<'s> Assignment<'s> {
    fn new(slots: &'s [SlotSpec]) -> Self {
        Self {
            slots,
            positions: vec![None; slots.len()],
            taken: BTreeSet::new(),
        }
    }

    fn free_slot(&self, chain: &ChainId, position: usize) -> Option<usize> {
        (0..self.slots.len()).find(|i| {
            self.positions[*i].is_none()
                && &self.slots[*i].chain == chain
                && self.slots[*i].allowed.contains(&position)
        })
    }

    fn free_copies(&self, chain: &ChainId) -> usize {
        (0..self.slots.len())
            .filter(|i| self.positions[*i].is_none() && &self.slots[*i].chain == chain)
            .count()
    }

    fn is_open(&self, position: usize) -> bool {
        !self.taken.contains(&position)
    }

    fn place(&mut self, chain: &ChainId, position: usize) -> bool {
        if !self.is_open(position) {
            return false;
        }
        match self.free_slot(chain, position) {
            Some(slot) => {
                self.positions[slot] = Some(position);
                self.taken.insert(position);
                true
            }
            None => false,
        }
    }

    fn place_slot(&mut self, slot: usize, position: usize) -> bool {
        if self.positions[slot].is_some() || !self.is_open(position) {
            return false;
        }
        self.positions[slot] = Some(position);
        self.taken.insert(position);
        true
    }

    fn unassigned(&self) -> Vec<usize> {
        (0..self.slots.len())
            .filter(|i| self.positions[*i].is_none())
            .collect()
    }

    fn open_positions(&self) -> Vec<usize> {
        (1..=self.slots.len()).filter(|p| self.is_open(*p)).collect()
    }
}

/// Greedy position assignment for one combination.
///
/// Slots whose type allows a single position are placed first. Then, until nothing
/// changes: positions with exactly one candidate chain are assigned (binding candidates
/// shadow optional ones); failing that, the candidate whose `(binding, support)` strictly
/// beats every competitor for its position or chain is assigned; failing that, the
/// remaining slots are deduced when only one is left or all remaining chains are
/// identical. Assignments are never retracted and unresolved slots stay `None`.
pub fn assign_positions(slots: &[SlotSpec], candidates: &[Candidate]) -> Vec<Option<usize>> {
    let mut state = Assignment::new(slots);

    for (slot, spec) in slots.iter().enumerate() {
        if spec.allowed.len() == 1 {
            if let Some(position) = spec.allowed.iter().next() {
                state.place_slot(slot, *position);
            }
        }
    }

    loop {
        let live: Vec<&Candidate> = candidates
            .iter()
            .filter(|c| state.is_open(c.position) && state.free_slot(&c.chain, c.position).is_some())
            .collect();

        if place_unique(&mut state, &live) || place_strongest(&mut state, &live) || deduce(&mut state) {
            continue;
        }
        break;
    }
    state.positions
}

fn place_unique(state: &mut Assignment<'_>, live: &[&Candidate]) -> bool {
    let mut at: BTreeMap<usize, Vec<&Candidate>> = BTreeMap::new();
    for candidate in live {
        at.entry(candidate.position).or_default().push(candidate);
    }

    let mut unique: BTreeMap<&ChainId, Vec<usize>> = BTreeMap::new();
    for (position, here) in &at {
        let binding = here.iter().any(|c| c.binding);
        let chains: BTreeSet<&ChainId> = here
            .iter()
            .filter(|c| c.binding || !binding)
            .map(|c| &c.chain)
            .collect();
        if chains.len() == 1 {
            if let Some(chain) = chains.into_iter().next() {
                unique.entry(chain).or_default().push(*position);
            }
        }
    }

    let mut placed = false;
    for (chain, positions) in unique {
        // more unique positions than copies: ambiguous, leave for later steps
        if positions.len() > state.free_copies(chain) {
            continue;
        }
        for position in positions {
            placed |= state.place(chain, position);
        }
    }
    placed
}

fn place_strongest(state: &mut Assignment<'_>, live: &[&Candidate]) -> bool {
    let mut ranked: Vec<&Candidate> = live.to_vec();
    ranked.sort_by(|a, b| b.key().cmp(&a.key()));

    for candidate in ranked {
        let beats_all = live
            .iter()
            .filter(|o| {
                (o.position == candidate.position || o.chain == candidate.chain)
                    && !(o.position == candidate.position && o.chain == candidate.chain)
            })
            .all(|o| o.key() < candidate.key());
        if beats_all {
            return state.place(&candidate.chain, candidate.position);
        }
    }
    false
}

fn deduce(state: &mut Assignment<'_>) -> bool {
    let unassigned = state.unassigned();
    let open = state.open_positions();
    if unassigned.is_empty() || open.is_empty() {
        return false;
    }

    if unassigned.len() == 1 && open.len() == 1 {
        let (slot, position) = (unassigned[0], open[0]);
        return state.slots[slot].allowed.contains(&position) && state.place_slot(slot, position);
    }

    let first = &state.slots[unassigned[0]].chain;
    if unassigned.iter().all(|i| &state.slots[*i].chain == first) {
        let chain = first.clone();
        let mut placed = false;
        for position in open {
            placed |= state.place(&chain, position);
        }
        return placed;
    }
    false
}

/// Placement of identical chains: index order
pub fn assign_in_order(slots: usize) -> Vec<Option<usize>> {
    (1..=slots).map(Some).collect()
}

/// Final position of one chain of a combination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainPosition {
    /// Chain id
    pub chain: ChainId,
    /// 1-based position; serialized as `-1` when unassigned
    #[serde(with = "position_sentinel")]
    pub position: Option<usize>,
}

/// Position vector of one combination with the rules that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionAssignment {
    /// Chains in slot order with their positions
    pub chains: Vec<ChainPosition>,
    /// Names of the rules whose recommendations were used
    pub evidence: Vec<String>,
}

impl PositionAssignment {
    /// Whether every chain has a position
    pub fn is_resolved(&self) -> bool {
        self.chains.iter().all(|c| c.position.is_some())
    }

    /// Chains ordered by position, e.g. `16:0/18:1`; unassigned chains keep `_` separators
    pub fn notation(&self) -> String {
        if !self.is_resolved() {
            return self
                .chains
                .iter()
                .map(|c| c.chain.as_str())
                .collect::<Vec<_>>()
                .join("_");
        }
        let mut ordered: Vec<&ChainPosition> = self.chains.iter().collect();
        ordered.sort_by_key(|c| c.position);
        ordered
            .iter()
            .map(|c| c.chain.as_str())
            .collect::<Vec<_>>()
            .join("/")
    }
}

mod position_sentinel {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(position) => serializer.serialize_i64(*position as i64),
            None => serializer.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Ok(usize::try_from(raw).ok().filter(|p| *p > 0))
    }
}
