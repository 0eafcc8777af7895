use std::fmt;
use std::ops::AddAssign;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{ElementalFormula, FormulaError};

/// A stable-isotope label carried by a chain or budgeted for an analyte, e.g. `D7`.
///
/// An empty label means "unlabelled".
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IsotopeLabel(ElementalFormula);

impl IsotopeLabel {
    /// The unlabelled state
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether no isotope is present
    pub fn is_none(&self) -> bool {
        self.0.is_empty()
    }

    /// The label as an elemental composition
    pub fn as_formula(&self) -> &ElementalFormula {
        &self.0
    }
}

impl FromStr for IsotopeLabel {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let formula: ElementalFormula = s.parse()?;
        if formula.iter().any(|(e, n)| !e.is_isotope_label() || n < 0) {
            return Err(FormulaError::InvalidLabel(s.to_string()));
        }
        Ok(Self(formula))
    }
}

impl TryFrom<String> for IsotopeLabel {
    type Error = FormulaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IsotopeLabel> for String {
    fn from(value: IsotopeLabel) -> Self {
        value.to_string()
    }
}

impl fmt::Display for IsotopeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Labels always print their count, "D1" rather than "D"
        for (element, count) in self.0.iter() {
            write!(f, "{}{}", element, count)?;
        }
        Ok(())
    }
}

impl AddAssign<&IsotopeLabel> for IsotopeLabel {
    fn add_assign(&mut self, rhs: &IsotopeLabel) {
        self.0 += &rhs.0;
    }
}
