use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info, trace};

use super::config::ScorerConfig;
use super::cutoff::apply_chain_cutoff;
use super::diagnostics::{DiagnosticsSink, Reason, Stage};
use super::error::{EvidenceError, PeakError};
use super::peaks::{BasePeakService, PeakAreaService, PeakQuery, ProbeStatus};
use super::position::{
    assign_in_order, assign_positions, recommend, ChainPosition, PositionAssignment, PositionVote,
    SlotSpec,
};
use super::result::{FoundFragment, FulfilledRule, IdentificationResult};
use super::status::{IdentificationStatus, StatusLadder};
use crate::chains::{Chain, ChainId};
use crate::chemistry::ElementalFormula;
use crate::combinatorics::{ChainCombination, PotentialCombinations};
use crate::fragments::{FragmentPredictor, PredictedFragment};
use crate::rules::{
    ClassRules, ComparisonMode, FragmentSource, FragmentTerm, IntensityRule, MandatoryPolicy,
    RuleScope,
};

/// The analyte and everything derived from it before scoring
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    /// Lipid class
    pub class: &'a str,
    /// Adduct or modification
    pub adduct: &'a str,
    /// Precursor formula including the adduct
    pub precursor: &'a ElementalFormula,
    /// Total hydroxylation sites of the analyte
    pub hydroxyls: u32,
    /// Rules of the class
    pub rules: &'a ClassRules,
    /// Generated chain combinations
    pub combinations: &'a PotentialCombinations,
}

enum Measurement {
    Found(FoundFragment),
    Missing,
    Unusable,
}

/// Found fragments of one owner (the head group or a chain)
#[derive(Debug, Clone, Default)]
struct OwnerEvidence {
    found: BTreeMap<String, FoundFragment>,
    class_evidence: bool,
}

impl OwnerEvidence {
    fn insert(&mut self, fragment: &PredictedFragment, found: FoundFragment) {
        self.class_evidence |= fragment.policy == MandatoryPolicy::Class;
        self.found.insert(fragment.name.clone(), found);
    }

    fn total_area(&self) -> f64 {
        self.found.values().map(|f| f.area).sum()
    }

    fn area(&self, name: &str, mode: ComparisonMode) -> Option<f64> {
        let fragment = self.found.get(name)?;
        match mode {
            ComparisonMode::Absolute => Some(fragment.area),
            ComparisonMode::Relative => Some(fragment.area / self.total_area()),
        }
    }
}

/// Evidence scoring state machine for one analyte.
///
/// Walks the status ladder `NoMsnPresent -> HeadGroupDetected -> FragmentsDetected ->
/// PositionDetected`. A discard ends scoring unless debug mode is on, in which case
/// the remaining stages still run to fill the diagnostic trail; the ladder ignores any
/// move after a discard, so the final status is the same either way.
pub struct EvidenceScorer<'a> {
    context: ScoringContext<'a>,
    peaks: &'a dyn PeakAreaService,
    base_peaks: &'a dyn BasePeakService,
    config: ScorerConfig,

    ladder: StatusLadder,
    diagnostics: Option<DiagnosticsSink>,
    levels: BTreeSet<u8>,
    base_peak_values: BTreeMap<u8, f64>,
    head: OwnerEvidence,
    class_declared: bool,
    chains: BTreeMap<ChainId, OwnerEvidence>,
    fulfilled: Vec<FulfilledRule>,
    retained: Vec<&'a ChainCombination>,
    positions: BTreeMap<String, PositionAssignment>,
    coverage: BTreeMap<u8, f64>,
}

impl<'a> EvidenceScorer<'a> {
    /// Scorer over the given collaborators
    pub fn new(
        context: ScoringContext<'a>,
        peaks: &'a dyn PeakAreaService,
        base_peaks: &'a dyn BasePeakService,
        config: ScorerConfig,
    ) -> Self {
        Self {
            context,
            peaks,
            base_peaks,
            config,
            ladder: StatusLadder::new(),
            diagnostics: config.debug.then(DiagnosticsSink::new),
            levels: BTreeSet::new(),
            base_peak_values: BTreeMap::new(),
            head: OwnerEvidence::default(),
            class_declared: false,
            chains: BTreeMap::new(),
            fulfilled: Vec::new(),
            retained: Vec::new(),
            positions: BTreeMap::new(),
            coverage: BTreeMap::new(),
        }
    }

    /// Run every stage and build the result
    pub fn score(mut self) -> Result<IdentificationResult, EvidenceError> {
        info!(
            "Scoring {} {} against {} combinations",
            self.context.class,
            self.context.adduct,
            self.context.combinations.len()
        );

        self.levels = self.peaks.ms_levels().into_iter().filter(|l| *l >= 2).collect();
        if self.levels.is_empty() {
            self.note(Stage::Setup, Reason::NoMsnLevel, self.context.class, "no MSn spectra");
            return Ok(self.finish());
        }
        self.base_peak_values = self.base_peaks.extract_base_peak_values(&self.levels)?;
        debug!("Base peaks: {:?}", self.base_peak_values);

        self.score_head()?;
        if self.halted() {
            return Ok(self.finish());
        }
        self.score_chains()?;
        if self.halted() {
            return Ok(self.finish());
        }
        self.check_coverage();
        if self.halted() {
            return Ok(self.finish());
        }
        if self.context.rules.has_multiple_positions() {
            self.resolve_positions();
        }
        Ok(self.finish())
    }

    fn halted(&self) -> bool {
        self.ladder.is_discarded() && !self.config.debug
    }

    fn note(&mut self, stage: Stage, reason: Reason, subject: &str, detail: impl Into<String>) {
        let detail = detail.into();
        trace!("{:?}/{:?} {}: {}", stage, reason, subject, detail);
        if let Some(sink) = self.diagnostics.as_mut() {
            sink.record(stage, reason, subject, detail);
        }
    }

    fn discard(&mut self, stage: Stage, reason: Reason, subject: &str, detail: impl Into<String>) {
        let detail = detail.into();
        if self.ladder.discard() {
            info!("{} {} discarded: {}", self.context.class, self.context.adduct, detail);
        }
        self.note(stage, reason, subject, detail);
    }

    fn predictor(&self) -> FragmentPredictor<'a> {
        FragmentPredictor::new(self.context.class, self.context.precursor)
            .with_quantification(self.config.quantification)
    }

    fn measure(&mut self, stage: Stage, owner: &str, fragment: &PredictedFragment) -> Result<Measurement, PeakError> {
        let subject = format!("{}/{}", owner, fragment.name);
        if !self.levels.contains(&fragment.ms_level) {
            self.note(stage, Reason::UnusableLevel, &subject, format!("MS{}", fragment.ms_level));
            return Ok(Measurement::Unusable);
        }

        let query = PeakQuery {
            name: &fragment.name,
            mz: fragment.mz,
            formula: &fragment.formula,
            ms_level: fragment.ms_level,
            charge: fragment.charge,
        };
        let probe = match self.peaks.calculate_area(&query) {
            Ok(probe) => probe,
            // past a discard only the diagnostic trail is at stake
            Err(e) if self.ladder.is_discarded() => {
                self.note(stage, Reason::ExtractionFailed, &subject, e.to_string());
                return Ok(Measurement::Missing);
            }
            Err(e) => return Err(e),
        };

        match &probe.status {
            ProbeStatus::Ok if probe.area > 0.0 => {}
            ProbeStatus::Failed(reason) => {
                self.note(stage, Reason::ExtractionFailed, &subject, reason.clone());
                return Ok(Measurement::Missing);
            }
            _ => {
                self.note(stage, Reason::MissingPeak, &subject, format!("m/z {:.4}", fragment.mz));
                return Ok(Measurement::Missing);
            }
        }

        let base_peak = self.base_peak_values.get(&fragment.ms_level).copied().unwrap_or(0.0);
        let threshold = self.context.rules.base_peak_cutoff * base_peak;
        if probe.area < threshold {
            self.note(
                stage,
                Reason::BelowBasePeakCutoff,
                &subject,
                format!("{:.3e} < {:.3e}", probe.area, threshold),
            );
            return Ok(Measurement::Missing);
        }

        Ok(Measurement::Found(FoundFragment {
            mz: fragment.mz,
            area: probe.area,
            ms_level: fragment.ms_level,
            from_other_species: probe.from_other_species,
            peak_mz: probe.peak_mz,
        }))
    }

    fn score_head(&mut self) -> Result<(), EvidenceError> {
        let rules = self.context.rules;
        let fragments = self
            .predictor()
            .head(&rules.head_fragments, self.context.hydroxyls)?;
        self.class_declared |= fragments.has_policy(MandatoryPolicy::Class);

        let mut head = OwnerEvidence::default();
        for fragment in &fragments.mandatory {
            match self.measure(Stage::HeadGroup, "head", fragment)? {
                Measurement::Found(found) => head.insert(fragment, found),
                Measurement::Missing => {
                    self.discard(
                        Stage::HeadGroup,
                        Reason::MissingPeak,
                        &fragment.name,
                        format!("mandatory head fragment {} missing", fragment.name),
                    );
                    if self.halted() {
                        return Ok(());
                    }
                }
                Measurement::Unusable => {}
            }
        }
        for fragment in &fragments.optional {
            if let Measurement::Found(found) = self.measure(Stage::HeadGroup, "head", fragment)? {
                head.insert(fragment, found);
            }
        }
        self.head = head;

        for rule in &rules.head_intensity_rules {
            let fulfilled = self.rule_fulfilled(rule, Some(&self.head), Some(&self.head));
            if fulfilled {
                self.record_fulfilled(rule, RuleScope::Head, "head".to_string());
            } else if rule.mandatory {
                self.discard(
                    Stage::HeadGroup,
                    Reason::IntensityRuleFailed,
                    &rule.name,
                    format!("mandatory head rule {} failed", rule),
                );
                if self.halted() {
                    return Ok(());
                }
            } else {
                self.note(Stage::HeadGroup, Reason::IntensityRuleFailed, &rule.name, rule.to_string());
            }
        }

        self.ladder.advance(IdentificationStatus::HeadGroupDetected);
        debug!("Head group: {} fragments found", self.head.found.len());
        Ok(())
    }

    fn score_chains(&mut self) -> Result<(), EvidenceError> {
        let combinations = self.context.combinations;
        let rules = self.context.rules;
        let predictor = self.predictor();

        for (id, chain) in combinations.unique_chains() {
            if let Some(evidence) = self.score_chain(&predictor, chain)? {
                self.chains.insert(id.clone(), evidence);
            }
        }
        debug!(
            "{} of {} chains survived",
            self.chains.len(),
            combinations.unique_chains().len()
        );

        let pairwise: Vec<&IntensityRule> = rules
            .chain_intensity_rules
            .iter()
            .filter(|r| r.scope() == RuleScope::Pairwise)
            .collect();

        let mut candidates = Vec::new();
        for combination in combinations.combinations() {
            if let Some(missing) = combination.chain_ids().find(|id| !self.chains.contains_key(*id)) {
                let detail = format!("chain {} did not survive", missing);
                self.note(Stage::Chains, Reason::CombinationRejected, combination.id(), detail);
                continue;
            }
            if self.pairwise_satisfied(combination, &pairwise) {
                candidates.push(combination);
            }
        }

        let chain_areas: BTreeMap<ChainId, f64> = self
            .chains
            .iter()
            .map(|(id, evidence)| (id.clone(), evidence.total_area()))
            .collect();
        let outcome = apply_chain_cutoff(candidates, &chain_areas, rules.chain_cutoff);
        for removal in &outcome.removed {
            self.note(
                Stage::Cutoff,
                Reason::BelowChainCutoff,
                &removal.combination,
                format!("{:.3e} < {:.3e}", removal.aggregate, removal.threshold),
            );
        }
        debug!(
            "Chain cutoff kept {} combinations after {} passes",
            outcome.retained.len(),
            outcome.passes
        );
        self.retained = outcome.retained;

        if !self.retained.is_empty() {
            self.ladder.advance(IdentificationStatus::FragmentsDetected);
        }
        Ok(())
    }

    /// Fragments and same-chain rules of one chain; `None` when the chain is discarded
    fn score_chain(
        &mut self,
        predictor: &FragmentPredictor<'a>,
        chain: &Chain,
    ) -> Result<Option<OwnerEvidence>, EvidenceError> {
        let rules = self.context.rules;
        let id = chain.id().as_str();
        let fragments = predictor.chain(&rules.chain_fragments, chain)?;
        self.class_declared |= fragments.has_policy(MandatoryPolicy::Class);

        let mut evidence = OwnerEvidence::default();
        for fragment in &fragments.mandatory {
            match self.measure(Stage::Chains, id, fragment)? {
                Measurement::Found(found) => evidence.insert(fragment, found),
                Measurement::Missing => {
                    let detail = format!("mandatory fragment {} missing", fragment.name);
                    self.note(Stage::Chains, Reason::ChainDiscarded, id, detail);
                    return Ok(None);
                }
                Measurement::Unusable => {}
            }
        }
        for fragment in &fragments.optional {
            if let Measurement::Found(found) = self.measure(Stage::Chains, id, fragment)? {
                evidence.insert(fragment, found);
            }
        }
        if evidence.found.is_empty() {
            self.note(Stage::Chains, Reason::ChainDiscarded, id, "no fragment found");
            return Ok(None);
        }

        for rule in &rules.chain_intensity_rules {
            let applies = rule.scope() == RuleScope::SameChain
                && rule
                    .terms()
                    .iter()
                    .filter_map(|t| t.chain_type())
                    .all(|t| t == chain.chain_type());
            if !applies {
                continue;
            }
            if self.rule_fulfilled(rule, Some(&evidence), Some(&evidence)) {
                self.record_fulfilled(rule, RuleScope::SameChain, id.to_string());
            } else if rule.mandatory {
                let detail = format!("mandatory rule {} failed", rule);
                self.note(Stage::Chains, Reason::ChainDiscarded, id, detail);
                return Ok(None);
            } else {
                self.note(Stage::Chains, Reason::IntensityRuleFailed, id, rule.to_string());
            }
        }
        Ok(Some(evidence))
    }

    /// Pairwise rules over every ordered pair of distinct member slots whose types match
    /// the rule's terms; a mandatory rule needs at least one fulfilled pair when any pair
    /// applies
    fn pairwise_satisfied(&mut self, combination: &ChainCombination, rules: &[&IntensityRule]) -> bool {
        let members = combination.chains();
        for rule in rules {
            let mut applicable = false;
            let mut any_fulfilled = false;
            for (i, bigger) in members.iter().enumerate() {
                for (j, smaller) in members.iter().enumerate() {
                    if i == j || !term_matches(&rule.bigger, bigger) || !term_matches(&rule.smaller, smaller) {
                        continue;
                    }
                    applicable = true;
                    let fulfilled = self.rule_fulfilled(
                        rule,
                        self.chains.get(bigger.id()),
                        self.chains.get(smaller.id()),
                    );
                    if fulfilled {
                        any_fulfilled = true;
                        let subject = format!("{}|{}", bigger.id(), smaller.id());
                        self.record_fulfilled(rule, RuleScope::Pairwise, subject);
                    }
                }
            }
            if rule.mandatory && applicable && !any_fulfilled {
                let detail = format!("mandatory pairwise rule {} failed", rule);
                self.note(Stage::Chains, Reason::CombinationRejected, combination.id(), detail);
                return false;
            }
        }
        true
    }

    fn fragment_level(&self, term: &FragmentTerm) -> Option<u8> {
        let rules = self.context.rules;
        match term.source {
            FragmentSource::Head => rules.head_fragment(&term.fragment).map(|r| r.ms_level),
            FragmentSource::Chain { .. } => rules.chain_fragment(&term.fragment).map(|r| r.ms_level),
            FragmentSource::BasePeak => None,
        }
    }

    fn term_value(
        &self,
        term: &FragmentTerm,
        owner: Option<&OwnerEvidence>,
        opposite: &FragmentTerm,
        mode: ComparisonMode,
    ) -> Option<f64> {
        match term.source {
            FragmentSource::BasePeak => {
                let level = self.fragment_level(opposite)?;
                self.base_peak_values.get(&level).copied()
            }
            _ => owner?.area(&term.fragment, mode),
        }
    }

    /// `bigger.factor * area(bigger) > smaller.factor * area(smaller)`; a missing bigger
    /// fragment fails the rule, a missing smaller one counts as zero
    fn rule_fulfilled(
        &self,
        rule: &IntensityRule,
        bigger_owner: Option<&OwnerEvidence>,
        smaller_owner: Option<&OwnerEvidence>,
    ) -> bool {
        let bigger = self.term_value(&rule.bigger, bigger_owner, &rule.smaller, rule.mode);
        let smaller = self.term_value(&rule.smaller, smaller_owner, &rule.bigger, rule.mode);
        match bigger {
            Some(bigger) => rule.bigger.factor * bigger > rule.smaller.factor * smaller.unwrap_or(0.0),
            None => false,
        }
    }

    fn record_fulfilled(&mut self, rule: &IntensityRule, scope: RuleScope, subject: String) {
        let entry = FulfilledRule {
            rule: rule.name.clone(),
            scope,
            subject,
        };
        if !self.fulfilled.contains(&entry) {
            self.fulfilled.push(entry);
        }
    }

    fn check_coverage(&mut self) {
        let rules = self.context.rules;

        let mut retained_chains: BTreeSet<&ChainId> = BTreeSet::new();
        for combination in &self.retained {
            retained_chains.extend(combination.chain_ids());
        }
        let owners: Vec<&OwnerEvidence> = std::iter::once(&self.head)
            .chain(retained_chains.iter().filter_map(|id| self.chains.get(*id)))
            .collect();

        // one centroid may be claimed by several fragments within the tolerance window
        let mut explained: BTreeMap<(u8, u64), f64> = BTreeMap::new();
        for fragment in owners.iter().flat_map(|o| o.found.values()) {
            if !fragment.from_other_species {
                explained.insert((fragment.ms_level, fragment.matched_mz().to_bits()), fragment.area);
            }
        }
        let class_found = owners.iter().any(|o| o.class_evidence);

        let mut coverage = BTreeMap::new();
        for level in &self.levels {
            let total = self.peaks.total_intensity(*level);
            if total <= 0.0 {
                continue;
            }
            let area: f64 = explained
                .iter()
                .filter(|((l, _), _)| l == level)
                .map(|(_, area)| area)
                .sum();
            coverage.insert(*level, (area / total).min(1.0));
        }
        let best = coverage.values().copied().fold(0.0, f64::max);
        self.coverage = coverage;

        if rules.spectrum_coverage_min > 0.0 && best < rules.spectrum_coverage_min {
            let detail = format!("{:.3} < {:.3}", best, rules.spectrum_coverage_min);
            self.discard(Stage::Coverage, Reason::CoverageInsufficient, self.context.class, detail);
        } else if self.class_declared && !class_found {
            self.discard(
                Stage::Coverage,
                Reason::CoverageInsufficient,
                self.context.class,
                "no class-specific fragment found",
            );
        }
    }

    fn resolve_positions(&mut self) {
        let rules = self.context.rules;
        let retained = self.retained.clone();
        let mut any_resolved = false;

        for combination in retained {
            let assignment = if combination.is_homogeneous() {
                let chains = combination
                    .chain_ids()
                    .zip(assign_in_order(combination.len()))
                    .map(|(chain, position)| ChainPosition {
                        chain: chain.clone(),
                        position,
                    })
                    .collect();
                PositionAssignment {
                    chains,
                    evidence: Vec::new(),
                }
            } else {
                self.position_assignment(combination, rules)
            };

            trace!("{} -> {}", combination.id(), assignment.notation());
            any_resolved |= assignment.is_resolved();
            self.positions.insert(combination.id().to_string(), assignment);
        }

        if any_resolved {
            self.ladder.advance(IdentificationStatus::PositionDetected);
        }
    }

    fn position_assignment(&mut self, combination: &ChainCombination, rules: &ClassRules) -> PositionAssignment {
        let members = combination.chains();
        let slots: Vec<SlotSpec> = members
            .iter()
            .map(|c| SlotSpec {
                chain: c.id().clone(),
                allowed: rules.positions_for(c.chain_type(), members.len()),
            })
            .collect();

        let mut votes = Vec::new();
        for rule in &rules.position_intensity_rules {
            votes.extend(self.position_votes(rule, members, &slots));
        }

        let recommendations = recommend(&votes);
        for unresolved in &recommendations.unresolved {
            let subject = format!("{}@{}", combination.id(), unresolved.group);
            self.note(Stage::Position, unresolved.reason, &subject, "");
        }

        let positions = assign_positions(&slots, &recommendations.candidates);
        let chains: Vec<ChainPosition> = slots
            .iter()
            .zip(positions)
            .map(|(slot, position)| ChainPosition {
                chain: slot.chain.clone(),
                position,
            })
            .collect();

        let mut evidence: Vec<String> = recommendations
            .candidates
            .iter()
            .filter(|c| chains.iter().any(|p| p.chain == c.chain && p.position == Some(c.position)))
            .flat_map(|c| c.rules.iter().cloned())
            .collect();
        evidence.sort();
        evidence.dedup();

        PositionAssignment { chains, evidence }
    }

    /// Votes of one position rule for one combination. A single-position rule votes when
    /// exactly one distinct chain fulfils it; a two-position rule votes when exactly one
    /// ordered pair of distinct chains fulfils it.
    fn position_votes(&mut self, rule: &IntensityRule, members: &[Chain], slots: &[SlotSpec]) -> Vec<PositionVote> {
        let group = rule.position_pair_id();
        let placeable = |term: &FragmentTerm, slot: usize| {
            term.chain_type().is_none()
                || (term_matches(term, &members[slot])
                    && term.position().is_some_and(|p| slots[slot].allowed.contains(&p)))
        };
        let vote = |chain: &ChainId, position: usize| PositionVote {
            group: group.clone(),
            chain: chain.clone(),
            position,
            rule: rule.name.clone(),
            mandatory: rule.mandatory,
        };

        match rule.scope() {
            RuleScope::SameChain => {
                let Some(position) = rule.positions().first().copied() else {
                    return Vec::new();
                };
                let mut fulfilling: BTreeSet<&ChainId> = BTreeSet::new();
                for (slot, chain) in members.iter().enumerate() {
                    if !placeable(&rule.bigger, slot) || !placeable(&rule.smaller, slot) {
                        continue;
                    }
                    let evidence = self.chains.get(chain.id());
                    if self.rule_fulfilled(rule, evidence, evidence) {
                        fulfilling.insert(chain.id());
                    }
                }
                if fulfilling.len() != 1 {
                    return Vec::new();
                }
                let chain = fulfilling.into_iter().next().cloned();
                chain
                    .map(|chain| {
                        self.record_fulfilled(rule, RuleScope::SameChain, chain.to_string());
                        vec![vote(&chain, position)]
                    })
                    .unwrap_or_default()
            }
            RuleScope::Pairwise => {
                let (Some(bigger_at), Some(smaller_at)) = (rule.bigger.position(), rule.smaller.position()) else {
                    return Vec::new();
                };
                let mut fulfilling: BTreeSet<(&ChainId, &ChainId)> = BTreeSet::new();
                for (i, bigger) in members.iter().enumerate() {
                    for (j, smaller) in members.iter().enumerate() {
                        if i == j || bigger.id() == smaller.id() {
                            continue;
                        }
                        if !placeable(&rule.bigger, i) || !placeable(&rule.smaller, j) {
                            continue;
                        }
                        let fulfilled = self.rule_fulfilled(
                            rule,
                            self.chains.get(bigger.id()),
                            self.chains.get(smaller.id()),
                        );
                        if fulfilled {
                            fulfilling.insert((bigger.id(), smaller.id()));
                        }
                    }
                }
                if fulfilling.len() != 1 {
                    return Vec::new();
                }
                let pair = fulfilling
                    .into_iter()
                    .next()
                    .map(|(b, s)| (b.clone(), s.clone()));
                match pair {
                    Some((bigger, smaller)) => {
                        self.record_fulfilled(rule, RuleScope::Pairwise, format!("{}|{}", bigger, smaller));
                        vec![vote(&bigger, bigger_at), vote(&smaller, smaller_at)]
                    }
                    None => Vec::new(),
                }
            }
            RuleScope::Head => Vec::new(),
        }
    }

    fn finish(self) -> IdentificationResult {
        let (status, status_trail) = self.ladder.finish();
        info!(
            "{} {}: {}",
            self.context.class, self.context.adduct, status
        );

        let head_fragments = self.head.found;
        let chain_fragments = self
            .chains
            .into_iter()
            .map(|(id, evidence)| (id, evidence.found))
            .collect();

        IdentificationResult {
            class: self.context.class.to_string(),
            adduct: self.context.adduct.to_string(),
            status,
            status_trail,
            head_fragments,
            chain_fragments,
            fulfilled_intensity_rules: self.fulfilled,
            valid_combinations: self.retained.iter().map(|c| c.id().to_string()).collect(),
            position_assignments: self.positions,
            base_peak_values: self.base_peak_values,
            coverage: self.coverage,
            diagnostics: self.diagnostics.map(DiagnosticsSink::into_entries),
        }
    }
}

fn term_matches(term: &FragmentTerm, chain: &Chain) -> bool {
    term.chain_type().map_or(true, |t| t == chain.chain_type())
}
