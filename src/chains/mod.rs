//! # Chains Module
//!
//! Value objects for the moieties composing a lipid backbone and the typed chain
//! library the combinatorics generator draws candidates from.
//!
//! A [`Chain`] is immutable once constructed. Its identity is the [`ChainKey`]
//! `(type, carbons, double bonds, hydroxyls, label, oxidation)`; the library is a single
//! map keyed by that composite value object instead of nested per-attribute maps.

mod error;
mod library;

#[cfg(test)]
mod tests;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::chemistry::{ElementalFormula, IsotopeLabel};

pub use error::LibraryError;
pub use library::{ChainEntry, ChainLibraries, ChainLibrary, ChainLibraryProvider, SlotKey};

/// Kind of moiety attached to the lipid backbone
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainType {
    /// Ester-bound fatty acyl chain
    Acyl,
    /// Ether-bound alkyl chain (`O-`)
    Alkyl,
    /// Vinyl-ether-bound alkenyl chain (`P-`)
    Alkenyl,
    /// Sphingoid long-chain base
    Lcb,
}

impl ChainType {
    /// Every chain type, in canonical order
    pub const ALL: [ChainType; 4] = [
        ChainType::Acyl,
        ChainType::Alkyl,
        ChainType::Alkenyl,
        ChainType::Lcb,
    ];

    /// All fatty-acid-like sub-types, in canonical order
    pub const FATTY_ACID_TYPES: [ChainType; 3] =
        [ChainType::Acyl, ChainType::Alkyl, ChainType::Alkenyl];

    /// Whether this is one of the FA sub-types (acyl, alkyl, alkenyl)
    pub fn is_fatty_acid(&self) -> bool {
        !matches!(self, ChainType::Lcb)
    }

    /// Short name used in distribution identifiers
    pub fn short_name(&self) -> &'static str {
        match self {
            ChainType::Acyl => "acyl",
            ChainType::Alkyl => "alkyl",
            ChainType::Alkenyl => "alkenyl",
            ChainType::Lcb => "lcb",
        }
    }
}

impl fmt::Display for ChainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Structural identity of a chain
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChainKey {
    /// Chain type
    pub chain_type: ChainType,
    /// Number of carbon atoms
    pub carbons: u32,
    /// Number of double bonds
    pub double_bonds: u32,
    /// Number of hydroxylation sites
    pub hydroxyls: u32,
    /// Stable-isotope label (empty when unlabelled)
    pub label: IsotopeLabel,
    /// Oxidation state, e.g. `"O"` for an oxo group
    pub oxidation: Option<String>,
}

impl ChainKey {
    /// The slot this key occupies when labels and oxidation are ignored
    pub fn slot(&self) -> SlotKey {
        SlotKey {
            chain_type: self.chain_type,
            carbons: self.carbons,
            double_bonds: self.double_bonds,
            hydroxyls: self.hydroxyls,
        }
    }
}

impl fmt::Display for ChainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.label.is_none() {
            write!(f, "{}-", self.label)?;
        }
        match self.chain_type {
            ChainType::Acyl => write!(f, "{}:{}", self.carbons, self.double_bonds)?,
            ChainType::Alkyl => write!(f, "O-{}:{}", self.carbons, self.double_bonds)?,
            ChainType::Alkenyl => write!(f, "P-{}:{}", self.carbons, self.double_bonds)?,
            ChainType::Lcb => {
                let prefix = match self.hydroxyls {
                    1 => Some('m'),
                    2 => Some('d'),
                    3 => Some('t'),
                    _ => None,
                };
                match prefix {
                    Some(p) => write!(f, "{}{}:{}", p, self.carbons, self.double_bonds)?,
                    None => write!(
                        f,
                        "LCB{}:{};O{}",
                        self.carbons, self.double_bonds, self.hydroxyls
                    )?,
                }
            }
        }
        if self.chain_type.is_fatty_acid() && self.hydroxyls > 0 {
            if self.hydroxyls == 1 {
                write!(f, ";O")?;
            } else {
                write!(f, ";O{}", self.hydroxyls)?;
            }
        }
        // `;(O)` is an oxidation, `;O` a hydroxyl
        if let Some(oxidation) = &self.oxidation {
            write!(f, ";({})", oxidation)?;
        }
        Ok(())
    }
}

/// Printable chain identifier, e.g. `16:0`, `P-18:0`, `d18:1`, `D7-18:1`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(String);

impl ChainId {
    /// The identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&ChainKey> for ChainId {
    fn from(key: &ChainKey) -> Self {
        ChainId(key.to_string())
    }
}

/// A single acyl, alkyl, alkenyl or long-chain-base moiety
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    key: ChainKey,
    id: ChainId,
    formula: ElementalFormula,
    monoisotopic_mass: f64,
}

impl Chain {
    /// Create a chain; the mass is derived from the formula
    pub fn new(key: ChainKey, formula: ElementalFormula) -> Self {
        let id = ChainId::from(&key);
        let monoisotopic_mass = formula.monoisotopic_mass();
        Self {
            key,
            id,
            formula,
            monoisotopic_mass,
        }
    }

    /// Structural identity
    pub fn key(&self) -> &ChainKey {
        &self.key
    }

    /// Printable identifier
    pub fn id(&self) -> &ChainId {
        &self.id
    }

    /// Chain type
    pub fn chain_type(&self) -> ChainType {
        self.key.chain_type
    }

    /// Number of carbon atoms
    pub fn carbons(&self) -> u32 {
        self.key.carbons
    }

    /// Number of double bonds
    pub fn double_bonds(&self) -> u32 {
        self.key.double_bonds
    }

    /// Number of hydroxylation sites
    pub fn hydroxyls(&self) -> u32 {
        self.key.hydroxyls
    }

    /// Stable-isotope label
    pub fn label(&self) -> &IsotopeLabel {
        &self.key.label
    }

    /// Oxidation state
    pub fn oxidation(&self) -> Option<&str> {
        self.key.oxidation.as_deref()
    }

    /// Elemental formula of the chain
    pub fn formula(&self) -> &ElementalFormula {
        &self.formula
    }

    /// Monoisotopic mass in Da
    pub fn monoisotopic_mass(&self) -> f64 {
        self.monoisotopic_mass
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}
