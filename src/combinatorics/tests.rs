use super::*;
use crate::chains::{Chain, ChainKey, ChainLibrary, ChainType};
use crate::chemistry::{ElementalFormula, IsotopeLabel};
use proptest::prelude::*;

fn chain(chain_type: ChainType, carbons: u32, double_bonds: u32, hydroxyls: u32, label: &str) -> Chain {
    let key = ChainKey {
        chain_type,
        carbons,
        double_bonds,
        hydroxyls,
        label: label.parse().unwrap(),
        oxidation: None,
    };
    let hydrogens = 2 * carbons - 2 * double_bonds;
    let formula: ElementalFormula = format!("C{}H{}O{}", carbons, hydrogens, 2 + hydroxyls)
        .parse()
        .unwrap();
    Chain::new(key, formula)
}

fn library(chains: Vec<Chain>) -> ChainLibrary {
    let mut library = ChainLibrary::new("test");
    for chain in chains {
        library.insert(chain);
    }
    library
}

fn acyl_library(pairs: &[(u32, u32)]) -> ChainLibrary {
    library(
        pairs
            .iter()
            .map(|(c, db)| chain(ChainType::Acyl, *c, *db, 0, ""))
            .collect(),
    )
}

fn ids(combinations: &PotentialCombinations) -> Vec<String> {
    let mut ids: Vec<String> = combinations.combinations().map(|c| c.id().to_string()).collect();
    ids.sort();
    ids
}

// ==================== Hydroxylation ====================

#[test]
fn test_hydroxylation_split_within_bounds() {
    let topology = ChainTopology {
        acyl: 1,
        lcb: 1,
        ..Default::default()
    };
    let range = HydroxylRange::new(0, 2);

    let distributions = partition_hydroxylation(3, &topology, range, range).unwrap();
    let ids: Vec<String> = distributions.iter().map(OhDistribution::id).collect();
    assert_eq!(ids, vec!["acyl:1x1;lcb:2x1", "acyl:2x1;lcb:1x1"]);
    assert!(distributions.iter().all(|d| d.total_hydroxyls() == 3));
}

#[test]
fn test_hydroxylation_unsatisfiable() {
    let topology = ChainTopology {
        acyl: 1,
        lcb: 1,
        ..Default::default()
    };
    let range = HydroxylRange::new(0, 2);

    let err = partition_hydroxylation(5, &topology, range, range).unwrap_err();
    assert!(matches!(
        err,
        CombinatoricsError::ConstraintUnsatisfiable {
            requested: 5,
            fa_chains: 1,
            lcb_chains: 1,
            ..
        }
    ));
    assert!(err.to_string().contains("0-2 per chain"));
}

#[test]
fn test_hydroxylation_without_lcb() {
    let topology = ChainTopology::acyl(2);
    let fa = HydroxylRange::new(0, 1);

    let distributions = partition_hydroxylation(1, &topology, fa, HydroxylRange::default()).unwrap();
    assert_eq!(distributions.len(), 1);
    assert_eq!(distributions[0].id(), "acyl:0x1;acyl:1x1");

    let distributions = partition_hydroxylation(0, &topology, fa, HydroxylRange::default()).unwrap();
    assert_eq!(distributions[0].id(), "acyl:0x2");
}

#[test]
fn test_hydroxylation_unbounded_range() {
    let wide = HydroxylRange::new(0, u32::MAX);
    assert!(wide.admits_total(7, 3));
    assert!(!HydroxylRange::new(u32::MAX, u32::MAX).admits_total(u32::MAX, 2));

    let topology = ChainTopology::acyl(2);
    let distributions = partition_hydroxylation(2, &topology, wide, HydroxylRange::default()).unwrap();
    let mut ids: Vec<String> = distributions.iter().map(OhDistribution::id).collect();
    ids.sort();
    assert_eq!(ids, vec!["acyl:0x1;acyl:2x1", "acyl:1x2"]);
}

#[test]
fn test_fatty_acid_subtype_distribution() {
    let topology = ChainTopology {
        acyl: 1,
        alkyl: 1,
        ..Default::default()
    };
    let typed = distribute_fatty_acid_subtypes(&[0, 1], &topology);
    assert_eq!(typed.len(), 2);

    let distributions: Vec<String> = typed
        .into_iter()
        .map(|slots| OhDistribution::new(slots).id())
        .collect();
    assert!(distributions.contains(&"acyl:0x1;alkyl:1x1".to_string()));
    assert!(distributions.contains(&"acyl:1x1;alkyl:0x1".to_string()));

    // identical values leave nothing to distribute
    let typed = distribute_fatty_acid_subtypes(&[1, 1], &topology);
    assert_eq!(typed.len(), 1);
}

#[test]
fn test_per_chain_distributions_are_multisets() {
    let distributions = per_chain_distributions(4, 3, HydroxylRange::new(0, 2));
    assert_eq!(distributions, vec![vec![0, 2, 2], vec![1, 1, 2]]);
}

// ==================== Canonical helpers ====================

#[test]
fn test_canonical_set_first_seen_wins() {
    let mut seen = CanonicalSet::new();
    assert!(seen.insert(&[17, 18]));
    assert!(!seen.insert(&[18, 17]));
    assert!(seen.contains(&[18, 17]));
    assert_eq!(seen.len(), 1);

    let kept = dedup_permutations(vec![vec![3, 1], vec![1, 3], vec![2, 2]], |v| *v);
    assert_eq!(kept, vec![vec![3, 1], vec![2, 2]]);
}

#[test]
fn test_unique_permutations_and_sub_multisets() {
    assert_eq!(
        unique_permutations(&[2, 1, 1]),
        vec![vec![1, 1, 2], vec![1, 2, 1], vec![2, 1, 1]]
    );
    assert_eq!(sub_multisets(&[1, 0, 1], 2), vec![vec![0, 1], vec![1, 1]]);
    assert_eq!(sub_multisets(&[1, 0, 1], 0), vec![Vec::<u32>::new()]);
}

// ==================== Generator ====================

#[test]
fn test_carbon_partitions_prune() {
    let candidates = [14, 16, 17, 18, 20].into_iter().collect();
    let partitions = carbon_partitions(34, 2, &candidates);
    assert_eq!(partitions, vec![vec![14, 20], vec![16, 18], vec![17, 17]]);
    assert!(carbon_partitions(34, 0, &candidates).is_empty());
}

#[test]
fn test_permutation_equivalent_combinations_collapse() {
    let library = acyl_library(&[(16, 0), (17, 0), (17, 1), (18, 1)]);
    let distributions = partition_hydroxylation(
        0,
        &ChainTopology::acyl(2),
        HydroxylRange::fixed(0),
        HydroxylRange::default(),
    )
    .unwrap();
    let label = IsotopeLabel::none();

    let combinations = generate(&CombinationRequest {
        carbons: 34,
        double_bonds: 1,
        distributions: &distributions,
        fatty_acids: &library,
        lcbs: None,
        label: &label,
        oxidations: &[],
    });

    assert_eq!(ids(&combinations), vec!["16:0_18:1", "17:0_17:1"]);
    assert_eq!(combinations.unique_chains().len(), 4);
    let combination = combinations.get("17:0_17:1").unwrap();
    assert_eq!(combination.distribution(), "acyl:0x2");
    assert!(!combination.is_homogeneous());
}

#[test]
fn test_fixed_double_bond_slot() {
    let pooled = [(16, 0), (18, 0), (18, 1), (18, 2)].into_iter().collect();
    let combinations = carbon_double_bond_combinations(34, 2, 2, &pooled);
    assert_eq!(combinations, vec![vec![(16, 0), (18, 2)]]);
}

#[test]
fn test_isotope_label_budget() {
    let library = library(vec![
        chain(ChainType::Acyl, 16, 0, 0, ""),
        chain(ChainType::Acyl, 18, 1, 0, ""),
        chain(ChainType::Acyl, 18, 1, 0, "D7"),
    ]);
    let distributions = vec![OhDistribution::new(vec![
        OhSlot {
            chain_type: ChainType::Acyl,
            hydroxyls: 0,
        };
        2
    ])];
    let label: IsotopeLabel = "D7".parse().unwrap();

    let combinations = generate(&CombinationRequest {
        carbons: 34,
        double_bonds: 1,
        distributions: &distributions,
        fatty_acids: &library,
        lcbs: None,
        label: &label,
        oxidations: &[],
    });
    assert_eq!(ids(&combinations), vec!["16:0_D7-18:1"]);
}

#[test]
fn test_label_permutations_count_and_dedup() {
    let plain = chain(ChainType::Acyl, 18, 1, 0, "");
    let labelled = chain(ChainType::Acyl, 18, 1, 0, "D7");
    let options = vec![vec![&plain, &labelled], vec![&plain, &labelled]];

    let permutations = label_permutations(&options);
    assert_eq!(permutations.raw_candidates, 4);
    assert_eq!(permutations.choices.len(), 3);
}

#[test]
fn test_long_chain_base_combination() {
    let fatty_acids = library(vec![
        chain(ChainType::Acyl, 16, 0, 0, ""),
        chain(ChainType::Acyl, 16, 0, 1, ""),
    ]);
    let lcbs = library(vec![chain(ChainType::Lcb, 18, 1, 2, "")]);
    let topology = ChainTopology {
        acyl: 1,
        lcb: 1,
        ..Default::default()
    };
    let distributions =
        partition_hydroxylation(2, &topology, HydroxylRange::new(0, 1), HydroxylRange::new(2, 3))
            .unwrap();
    let label = IsotopeLabel::none();

    let combinations = generate(&CombinationRequest {
        carbons: 34,
        double_bonds: 1,
        distributions: &distributions,
        fatty_acids: &fatty_acids,
        lcbs: Some(&lcbs),
        label: &label,
        oxidations: &[],
    });
    assert_eq!(ids(&combinations), vec!["16:0_d18:1"]);

    let without_lcbs = generate(&CombinationRequest {
        carbons: 34,
        double_bonds: 1,
        distributions: &distributions,
        fatty_acids: &fatty_acids,
        lcbs: None,
        label: &label,
        oxidations: &[],
    });
    assert!(without_lcbs.is_empty());
}

#[test]
fn test_oxidation_budget() {
    let mut oxidized = chain(ChainType::Acyl, 18, 1, 0, "");
    let mut key = oxidized.key().clone();
    key.oxidation = Some("OOH".to_string());
    oxidized = Chain::new(key, oxidized.formula().clone());
    let library = library(vec![
        chain(ChainType::Acyl, 16, 0, 0, ""),
        chain(ChainType::Acyl, 18, 1, 0, ""),
        oxidized,
    ]);
    let distributions = vec![OhDistribution::new(vec![
        OhSlot {
            chain_type: ChainType::Acyl,
            hydroxyls: 0,
        };
        2
    ])];
    let label = IsotopeLabel::none();
    let oxidations = vec!["OOH".to_string()];

    let combinations = generate(&CombinationRequest {
        carbons: 34,
        double_bonds: 1,
        distributions: &distributions,
        fatty_acids: &library,
        lcbs: None,
        label: &label,
        oxidations: &oxidations,
    });
    assert_eq!(ids(&combinations), vec!["16:0_18:1;(OOH)"]);
}

#[test]
fn test_empty_library_yields_nothing() {
    let library = ChainLibrary::new("empty");
    let distributions = partition_hydroxylation(
        0,
        &ChainTopology::acyl(2),
        HydroxylRange::fixed(0),
        HydroxylRange::default(),
    )
    .unwrap();
    let label = IsotopeLabel::none();
    let combinations = generate(&CombinationRequest {
        carbons: 34,
        double_bonds: 1,
        distributions: &distributions,
        fatty_acids: &library,
        lcbs: None,
        label: &label,
        oxidations: &[],
    });
    assert!(combinations.is_empty());
}

// ==================== Properties ====================

proptest! {
    #[test]
    fn prop_combinations_match_totals(
        pairs in prop::collection::btree_set((10u32..22, 0u32..4), 1..12),
        slots in 1usize..4,
        carbons in 20u32..60,
        double_bonds in 0u32..6,
    ) {
        let pairs: Vec<(u32, u32)> = pairs.into_iter().collect();
        let library = acyl_library(&pairs);
        let distributions = vec![OhDistribution::new(vec![
            OhSlot { chain_type: ChainType::Acyl, hydroxyls: 0 };
            slots
        ])];
        let label = IsotopeLabel::none();
        let combinations = generate(&CombinationRequest {
            carbons,
            double_bonds,
            distributions: &distributions,
            fatty_acids: &library,
            lcbs: None,
            label: &label,
            oxidations: &[],
        });

        let mut seen = CanonicalSet::new();
        for combination in combinations.combinations() {
            prop_assert_eq!(combination.len(), slots);
            prop_assert_eq!(combination.carbons(), carbons);
            prop_assert_eq!(combination.double_bonds(), double_bonds);
            let keys: Vec<ChainKey> = combination.chains().iter().map(|c| c.key().clone()).collect();
            prop_assert!(seen.insert(&keys));
        }
    }

    #[test]
    fn prop_canonical_name_idempotent(parts in prop::collection::vec(0u32..50, 0..6)) {
        let name = canonical_name(&parts);
        let mut reparsed: Vec<u32> = if name.is_empty() {
            Vec::new()
        } else {
            name.split('_').map(|p| p.parse().unwrap()).collect()
        };
        prop_assert_eq!(canonical_name(&reparsed), name.clone());
        reparsed.reverse();
        prop_assert_eq!(canonical_name(&reparsed), name);
    }

    #[test]
    fn prop_hydroxylation_sums(
        total in 0u32..8,
        acyl in 0usize..3,
        lcb in 0usize..2,
        fa_max in 0u32..3,
        lcb_max in 0u32..4,
    ) {
        let topology = ChainTopology { acyl, lcb, ..Default::default() };
        let fa_range = HydroxylRange::new(0, fa_max);
        let lcb_range = HydroxylRange::new(0, lcb_max);
        let feasible = !split_hydroxylation(total, acyl, lcb, fa_range, lcb_range).is_empty();

        match partition_hydroxylation(total, &topology, fa_range, lcb_range) {
            Ok(distributions) => {
                prop_assert!(feasible);
                prop_assert!(!distributions.is_empty());
                for distribution in distributions {
                    prop_assert_eq!(distribution.total_hydroxyls(), total);
                    prop_assert_eq!(distribution.slots().len(), acyl + lcb);
                    for slot in distribution.slots() {
                        let range = if slot.chain_type == ChainType::Lcb { lcb_range } else { fa_range };
                        prop_assert!(range.contains(slot.hydroxyls));
                    }
                }
            }
            Err(_) => prop_assert!(!feasible),
        }
    }

    #[test]
    fn prop_mixed_radix_covers_product(counts in prop::collection::vec(1usize..5, 0..5)) {
        let radix = MixedRadix::new(&counts);
        let expected: usize = counts.iter().product();
        prop_assert_eq!(radix.total(), expected);

        let mut seen = std::collections::HashSet::new();
        for choices in radix.iter() {
            for (choice, count) in choices.iter().zip(&counts) {
                prop_assert!(choice < count);
            }
            prop_assert!(seen.insert(choices));
        }
        prop_assert_eq!(seen.len(), expected);
    }
}
