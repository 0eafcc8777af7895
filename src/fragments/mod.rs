//! # Fragments Module
//!
//! Theoretical fragment prediction for the head group and for individual chains.
//!
//! Prediction is a pure function of the rule set and the analyte or chain: every rule
//! valid at the owner's hydroxylation count is evaluated into a formula and m/z, then
//! sorted into the set of fragments required for the owner to survive and the set
//! that only contributes evidence.

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

use crate::chains::Chain;
use crate::chemistry::ElementalFormula;
use crate::rules::{FragmentRule, FragmentTarget, MandatoryPolicy, RuleError};

/// A fragment with its computed formula and m/z
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictedFragment {
    /// Rule name
    pub name: String,
    /// Fragment formula
    pub formula: ElementalFormula,
    /// Theoretical m/z
    pub mz: f64,
    /// Ion charge
    pub charge: i32,
    /// MS level the fragment is expected at
    pub ms_level: u8,
    /// Mandatory policy at the owner's hydroxylation count
    pub policy: MandatoryPolicy,
}

/// Fragments of one owner split by whether they gate its survival
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FragmentSet {
    /// Fragments that must be found
    pub mandatory: Vec<PredictedFragment>,
    /// Fragments that only add evidence
    pub optional: Vec<PredictedFragment>,
}

impl FragmentSet {
    /// All fragments, mandatory first
    pub fn iter(&self) -> impl Iterator<Item = &PredictedFragment> + '_ {
        self.mandatory.iter().chain(&self.optional)
    }

    /// Fragment by name
    pub fn get(&self, name: &str) -> Option<&PredictedFragment> {
        self.iter().find(|f| f.name == name)
    }

    /// Whether any fragment carries `policy`
    pub fn has_policy(&self, policy: MandatoryPolicy) -> bool {
        self.iter().any(|f| f.policy == policy)
    }

    /// Number of fragments
    pub fn len(&self) -> usize {
        self.mandatory.len() + self.optional.len()
    }

    /// Whether no rule applied
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Evaluates fragment rules for one analyte
#[derive(Debug, Clone, Copy)]
pub struct FragmentPredictor<'a> {
    class: &'a str,
    precursor: &'a ElementalFormula,
    quantification: bool,
}

impl<'a> FragmentPredictor<'a> {
    /// Predictor for `class` with the given precursor formula
    pub fn new(class: &'a str, precursor: &'a ElementalFormula) -> Self {
        Self {
            class,
            precursor,
            quantification: false,
        }
    }

    /// Treat `Quant` fragments as mandatory
    pub fn with_quantification(mut self, quantification: bool) -> Self {
        self.quantification = quantification;
        self
    }

    /// Head-group fragments valid at the analyte's hydroxylation count
    pub fn head(&self, rules: &[FragmentRule], hydroxyls: u32) -> Result<FragmentSet, RuleError> {
        let applicable = rules
            .iter()
            .filter(|r| r.target == FragmentTarget::Head && r.is_valid_for(hydroxyls));
        self.collect(applicable, hydroxyls, None)
    }

    /// Fragments of `chain` from the rules targeting its type
    pub fn chain(&self, rules: &[FragmentRule], chain: &Chain) -> Result<FragmentSet, RuleError> {
        let hydroxyls = chain.hydroxyls();
        let applicable = rules
            .iter()
            .filter(|r| r.targets(chain.chain_type()) && r.is_valid_for(hydroxyls));
        self.collect(applicable, hydroxyls, Some(chain.formula()))
    }

    fn collect<'r>(
        &self,
        rules: impl Iterator<Item = &'r FragmentRule>,
        hydroxyls: u32,
        chain: Option<&ElementalFormula>,
    ) -> Result<FragmentSet, RuleError> {
        let mut set = FragmentSet::default();
        for rule in rules {
            let fragment = self.predict(rule, hydroxyls, chain)?;
            if self.gates_survival(fragment.policy) {
                set.mandatory.push(fragment);
            } else {
                set.optional.push(fragment);
            }
        }
        Ok(set)
    }

    fn gates_survival(&self, policy: MandatoryPolicy) -> bool {
        match policy {
            MandatoryPolicy::Always => true,
            MandatoryPolicy::Quant => self.quantification,
            MandatoryPolicy::Class | MandatoryPolicy::Optional => false,
        }
    }

    fn predict(
        &self,
        rule: &FragmentRule,
        hydroxyls: u32,
        chain: Option<&ElementalFormula>,
    ) -> Result<PredictedFragment, RuleError> {
        let violation = |reason: &dyn std::fmt::Display| {
            RuleError::violation(self.class, rule.name.as_str(), reason)
        };
        let formula = rule
            .formula
            .evaluate(self.precursor, chain)
            .map_err(|e| violation(&e))?;
        let mz = formula.mz(rule.charge).map_err(|e| violation(&e))?;
        Ok(PredictedFragment {
            name: rule.name.clone(),
            formula,
            mz,
            charge: rule.charge,
            ms_level: rule.ms_level,
            policy: rule.policy_for(hydroxyls),
        })
    }
}
