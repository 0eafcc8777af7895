use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::debug;
use serde::{Deserialize, Serialize};

use super::{Chain, ChainKey, ChainType, LibraryError};
use crate::chemistry::{Element, ElementalFormula, FormulaError, IsotopeLabel};

/// A chain slot: the part of the identity that combinatorics reasons about,
/// ignoring isotope label and oxidation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    /// Chain type
    pub chain_type: ChainType,
    /// Number of carbon atoms
    pub carbons: u32,
    /// Number of double bonds
    pub double_bonds: u32,
    /// Number of hydroxylation sites
    pub hydroxyls: u32,
}

/// Typed lookup of concrete chains keyed by [`ChainKey`]
#[derive(Debug, Clone, Default)]
pub struct ChainLibrary {
    name: String,
    chains: HashMap<ChainKey, Chain>,
    slots: BTreeMap<SlotKey, BTreeSet<ChainKey>>,
}

impl ChainLibrary {
    /// Create an empty library
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Library name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a chain, replacing any chain with the same key
    pub fn insert(&mut self, chain: Chain) {
        let key = chain.key().clone();
        self.slots.entry(key.slot()).or_default().insert(key.clone());
        self.chains.insert(key, chain);
    }

    /// Number of chains
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Whether the library holds no chains
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Look up a chain by its structural identity
    pub fn get(&self, key: &ChainKey) -> Option<&Chain> {
        self.chains.get(key)
    }

    /// All chains in key order
    pub fn chains(&self) -> impl Iterator<Item = &Chain> + '_ {
        self.slots
            .values()
            .flat_map(|keys| keys.iter())
            .filter_map(|key| self.chains.get(key))
    }

    /// All label/oxidation variants that occupy `slot`, in key order
    pub fn variants(&self, slot: &SlotKey) -> Vec<&Chain> {
        self.slots
            .get(slot)
            .map(|keys| keys.iter().filter_map(|k| self.chains.get(k)).collect())
            .unwrap_or_default()
    }

    /// Candidate chains of one type carrying exactly `hydroxyls` hydroxylation sites
    pub fn by_type_and_hydroxyls(&self, chain_type: ChainType, hydroxyls: u32) -> Vec<&Chain> {
        self.chains()
            .filter(|c| c.chain_type() == chain_type && c.hydroxyls() == hydroxyls)
            .collect()
    }

    /// Principally possible `(carbons, double bonds)` pairs, ignoring type, hydroxylation and label
    pub fn carbon_double_bond_pairs(&self) -> BTreeSet<(u32, u32)> {
        self.slots
            .keys()
            .map(|slot| (slot.carbons, slot.double_bonds))
            .collect()
    }

    /// Chain types present in the library
    pub fn chain_types(&self) -> BTreeSet<ChainType> {
        self.slots.keys().map(|slot| slot.chain_type).collect()
    }

    /// Restrict the library to chains whose formula fits inside `analyte`
    pub fn plausible_for(&self, analyte: &ElementalFormula) -> ChainLibrary {
        let mut plausible = ChainLibrary::new(self.name.clone());
        for chain in self.chains() {
            if chain.formula().fits_within(analyte) {
                plausible.insert(chain.clone());
            }
        }
        if plausible.len() < self.len() {
            debug!(
                "Library '{}': {} of {} chains fit inside {}",
                self.name,
                plausible.len(),
                self.len(),
                analyte
            );
        }
        plausible
    }

    /// Add alkyl (`O-`) and alkenyl (`P-`) variants derived from every acyl chain.
    ///
    /// Acyl formulas are those of the free fatty acid; the alkyl moiety replaces the
    /// carbonyl oxygen by two hydrogens, the alkenyl moiety drops it.
    pub fn with_ether_variants(&self) -> ChainLibrary {
        let oxygen = ElementalFormula::from_counts([(Element::O, 1)]);
        let dihydrogen = ElementalFormula::from_counts([(Element::H, 2)]);

        let mut library = self.clone();
        for chain in self.chains().filter(|c| c.chain_type() == ChainType::Acyl) {
            let Ok(without_oxygen) = chain.formula().checked_sub(&oxygen) else {
                continue;
            };
            for (chain_type, formula) in [
                (ChainType::Alkyl, &without_oxygen + &dihydrogen),
                (ChainType::Alkenyl, without_oxygen.clone()),
            ] {
                let key = ChainKey {
                    chain_type,
                    ..chain.key().clone()
                };
                if library.get(&key).is_none() {
                    library.insert(Chain::new(key, formula));
                }
            }
        }
        library
    }
}

/// Serializable chain library entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainEntry {
    /// Chain type
    pub chain_type: ChainType,
    /// Number of carbon atoms
    pub carbons: u32,
    /// Number of double bonds
    pub double_bonds: u32,
    /// Number of hydroxylation sites
    #[serde(default)]
    pub hydroxyls: u32,
    /// Stable-isotope label prefix
    #[serde(default)]
    pub label: IsotopeLabel,
    /// Oxidation state
    #[serde(default)]
    pub oxidation: Option<String>,
    /// Elemental formula
    pub formula: ElementalFormula,
}

impl ChainEntry {
    /// Turn the entry into a chain, checking that the label is part of the formula
    pub fn to_chain(&self) -> Result<Chain, FormulaError> {
        if !self.label.as_formula().fits_within(&self.formula) {
            return Err(FormulaError::InvalidLabel(self.label.to_string()));
        }
        let key = ChainKey {
            chain_type: self.chain_type,
            carbons: self.carbons,
            double_bonds: self.double_bonds,
            hydroxyls: self.hydroxyls,
            label: self.label.clone(),
            oxidation: self.oxidation.clone(),
        };
        Ok(Chain::new(key, self.formula.clone()))
    }
}

/// Source of chain libraries by name
pub trait ChainLibraryProvider {
    /// Return the library registered under `library`
    fn chains_by_type(&self, library: &str) -> Result<ChainLibrary, LibraryError>;
}

/// In-memory collection of named chain libraries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainLibraries {
    libraries: BTreeMap<String, Vec<ChainEntry>>,
}

impl ChainLibraries {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a library
    pub fn insert(&mut self, name: impl Into<String>, entries: Vec<ChainEntry>) {
        self.libraries.insert(name.into(), entries);
    }

    /// Registered library names
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.libraries.keys().map(String::as_str)
    }
}

impl ChainLibraryProvider for ChainLibraries {
    fn chains_by_type(&self, library: &str) -> Result<ChainLibrary, LibraryError> {
        let entries = self
            .libraries
            .get(library)
            .ok_or_else(|| LibraryError::NotFound(library.to_string()))?;

        let mut chains = ChainLibrary::new(library);
        for entry in entries {
            let chain = entry.to_chain().map_err(|source| LibraryError::InvalidEntry {
                library: library.to_string(),
                source,
            })?;
            chains.insert(chain);
        }
        Ok(chains)
    }
}
