use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::FormulaError;

/// Rest mass of the electron in Da
pub const ELECTRON_MASS: f64 = 0.000_548_579_909;

/// Elements and stable isotopes that occur in lipid formulas.
///
/// The declaration order is the print order (Hill order with isotopes next to
/// their light counterpart), which the derived `Ord` relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Element {
    /// Carbon
    C,
    /// Carbon-13
    Cc,
    /// Hydrogen
    H,
    /// Deuterium
    D,
    /// Chlorine
    Cl,
    /// Fluorine
    F,
    /// Potassium
    K,
    /// Lithium
    Li,
    /// Nitrogen
    N,
    /// Nitrogen-15
    Nn,
    /// Sodium
    Na,
    /// Oxygen
    O,
    /// Phosphorus
    P,
    /// Sulfur
    S,
}

impl Element {
    /// Monoisotopic mass in Da
    pub fn monoisotopic_mass(&self) -> f64 {
        match self {
            Element::C => 12.0,
            Element::Cc => 13.003_354_837_8,
            Element::H => 1.007_825_032_07,
            Element::D => 2.014_101_777_8,
            Element::Cl => 34.968_852_68,
            Element::F => 18.998_403_22,
            Element::K => 38.963_706_68,
            Element::Li => 7.016_004_55,
            Element::N => 14.003_074_004_8,
            Element::Nn => 15.000_108_898_2,
            Element::Na => 22.989_769_280_9,
            Element::O => 15.994_914_619_56,
            Element::P => 30.973_761_63,
            Element::S => 31.972_071_00,
        }
    }

    /// The symbol used in formula strings
    pub fn symbol(&self) -> &'static str {
        match self {
            Element::C => "C",
            Element::Cc => "Cc",
            Element::H => "H",
            Element::D => "D",
            Element::Cl => "Cl",
            Element::F => "F",
            Element::K => "K",
            Element::Li => "Li",
            Element::N => "N",
            Element::Nn => "Nn",
            Element::Na => "Na",
            Element::O => "O",
            Element::P => "P",
            Element::S => "S",
        }
    }

    /// Whether this symbol denotes a heavy stable isotope used for labelling
    pub fn is_isotope_label(&self) -> bool {
        matches!(self, Element::Cc | Element::D | Element::Nn)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Element {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "C" => Ok(Element::C),
            "Cc" => Ok(Element::Cc),
            "H" => Ok(Element::H),
            "D" => Ok(Element::D),
            "Cl" => Ok(Element::Cl),
            "F" => Ok(Element::F),
            "K" => Ok(Element::K),
            "Li" => Ok(Element::Li),
            "N" => Ok(Element::N),
            "Nn" => Ok(Element::Nn),
            "Na" => Ok(Element::Na),
            "O" => Ok(Element::O),
            "P" => Ok(Element::P),
            "S" => Ok(Element::S),
            _ => Err(FormulaError::UnknownElement(s.to_string())),
        }
    }
}
