//! # Combinatorics Module
//!
//! Decomposes an analyte's sum composition into concrete chain combinations.
//!
//! The pipeline runs in two stages:
//!
//! 1. [`partition_hydroxylation`] splits the total hydroxylation count between FA-type
//!    chains and long-chain bases, then among the acyl/alkyl/alkenyl sub-types, yielding
//!    a list of [`OhDistribution`]s.
//! 2. [`generate`] enumerates carbon and double-bond partitions over the chain slots,
//!    binds every OH distribution to the library chains that exist for each slot, expands
//!    isotope-label variants through a mixed-radix index and drops permutation-equivalent
//!    results.
//!
//! Empty results at any step of the generator are valid; only an unsatisfiable
//! hydroxylation split is an error.
//!
//! ```rust
//! use lipidmsn::combinatorics::{partition_hydroxylation, ChainTopology, HydroxylRange};
//!
//! let topology = ChainTopology { acyl: 1, lcb: 1, ..Default::default() };
//! let range = HydroxylRange::new(0, 2);
//!
//! assert!(partition_hydroxylation(3, &topology, range, range).is_ok());
//! assert!(partition_hydroxylation(5, &topology, range, range).is_err());
//! ```

mod canonical;
mod error;
mod generator;
mod hydroxylation;
mod radix;

#[cfg(test)]
mod tests;

pub use canonical::{
    canonical_name, dedup_permutations, sub_multisets, unique_permutations, CanonicalSet,
};
pub use error::CombinatoricsError;
pub use generator::{
    carbon_double_bond_combinations, carbon_partitions, double_bond_assignments, generate,
    label_permutations, ChainCombination, CombinationRequest, LabelPermutations,
    PotentialCombinations,
};
pub use hydroxylation::{
    distribute_fatty_acid_subtypes, partition_hydroxylation, per_chain_distributions,
    split_hydroxylation, ChainTopology, HydroxylRange, OhDistribution, OhSlot,
};
pub use radix::MixedRadix;
