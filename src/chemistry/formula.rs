use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign, SubAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Element, FormulaError, ELECTRON_MASS};

/// An elemental composition with exact atom counts.
///
/// Counts are signed so that intermediate results of formula expressions may dip below
/// zero; [`ElementalFormula::ensure_non_negative`] turns such results into errors once
/// an expression is fully evaluated.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ElementalFormula {
    counts: BTreeMap<Element, i32>,
}

impl ElementalFormula {
    /// Create an empty formula
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a formula from explicit element counts (zero counts are dropped)
    pub fn from_counts(counts: impl IntoIterator<Item = (Element, i32)>) -> Self {
        let mut formula = Self::new();
        for (element, count) in counts {
            formula.add_count(element, count);
        }
        formula
    }

    /// Number of atoms of `element`
    pub fn count(&self, element: Element) -> i32 {
        self.counts.get(&element).copied().unwrap_or(0)
    }

    /// Whether the formula contains no atoms
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate over the non-zero element counts in print order
    pub fn iter(&self) -> impl Iterator<Item = (Element, i32)> + '_ {
        self.counts.iter().map(|(e, n)| (*e, *n))
    }

    fn add_count(&mut self, element: Element, count: i32) {
        if count == 0 {
            return;
        }
        let entry = self.counts.entry(element).or_insert(0);
        *entry += count;
        if *entry == 0 {
            self.counts.remove(&element);
        }
    }

    /// Subtract `other`, failing if any element count would become negative
    pub fn checked_sub(&self, other: &ElementalFormula) -> Result<ElementalFormula, FormulaError> {
        let mut result = self.clone();
        result -= other;
        result.ensure_non_negative()?;
        Ok(result)
    }

    /// Verify that no element has a negative count
    pub fn ensure_non_negative(&self) -> Result<(), FormulaError> {
        match self.counts.iter().find(|(_, n)| **n < 0) {
            Some((element, count)) => Err(FormulaError::NegativeCount {
                formula: self.to_string(),
                element: *element,
                count: *count,
            }),
            None => Ok(()),
        }
    }

    /// Whether every element count of `self` is covered by `other`
    pub fn fits_within(&self, other: &ElementalFormula) -> bool {
        self.counts.iter().all(|(e, n)| *n <= other.count(*e))
    }

    /// Sum of the element counts restricted to stable-isotope symbols
    pub fn isotope_part(&self) -> ElementalFormula {
        Self::from_counts(self.iter().filter(|(e, _)| e.is_isotope_label()))
    }

    /// Monoisotopic mass of the neutral composition in Da
    pub fn monoisotopic_mass(&self) -> f64 {
        self.counts
            .iter()
            .map(|(e, n)| e.monoisotopic_mass() * f64::from(*n))
            .sum()
    }

    /// m/z of the ion with this composition at `charge`, corrected for electron mass
    pub fn mz(&self, charge: i32) -> Result<f64, FormulaError> {
        if charge == 0 {
            return Err(FormulaError::ZeroCharge);
        }
        let mass = self.monoisotopic_mass() - f64::from(charge) * ELECTRON_MASS;
        Ok(mass / f64::from(charge.abs()))
    }
}

impl FromStr for ElementalFormula {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| FormulaError::Malformed {
            formula: s.to_string(),
            reason: reason.to_string(),
        };

        let mut formula = ElementalFormula::new();
        let chars: Vec<char> = s.trim().chars().collect();
        let mut i = 0;
        while i < chars.len() {
            if !chars[i].is_ascii_uppercase() {
                return Err(malformed("expected an element symbol"));
            }
            let start = i;
            i += 1;
            while i < chars.len() && chars[i].is_ascii_lowercase() {
                i += 1;
            }
            let symbol: String = chars[start..i].iter().collect();
            let element: Element = symbol.parse()?;

            let digits_start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let count = if digits_start == i {
                1
            } else {
                let digits: String = chars[digits_start..i].iter().collect();
                digits
                    .parse::<i32>()
                    .map_err(|_| malformed("atom count out of range"))?
            };
            formula.add_count(element, count);
        }
        Ok(formula)
    }
}

impl TryFrom<String> for ElementalFormula {
    type Error = FormulaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ElementalFormula> for String {
    fn from(value: ElementalFormula) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ElementalFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (element, count) in &self.counts {
            if *count == 1 {
                write!(f, "{}", element)?;
            } else {
                write!(f, "{}{}", element, count)?;
            }
        }
        Ok(())
    }
}

impl AddAssign<&ElementalFormula> for ElementalFormula {
    fn add_assign(&mut self, rhs: &ElementalFormula) {
        for (element, count) in &rhs.counts {
            self.add_count(*element, *count);
        }
    }
}

impl SubAssign<&ElementalFormula> for ElementalFormula {
    fn sub_assign(&mut self, rhs: &ElementalFormula) {
        for (element, count) in &rhs.counts {
            self.add_count(*element, -*count);
        }
    }
}

impl Add<&ElementalFormula> for &ElementalFormula {
    type Output = ElementalFormula;

    fn add(self, rhs: &ElementalFormula) -> ElementalFormula {
        let mut result = self.clone();
        result += rhs;
        result
    }
}
