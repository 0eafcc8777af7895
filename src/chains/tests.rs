use super::*;
use crate::chemistry::ElementalFormula;

fn acyl(carbons: u32, double_bonds: u32, formula: &str) -> ChainEntry {
    ChainEntry {
        chain_type: ChainType::Acyl,
        carbons,
        double_bonds,
        hydroxyls: 0,
        label: Default::default(),
        oxidation: None,
        formula: formula.parse().unwrap(),
    }
}

#[test]
fn test_chain_ids() {
    let key = |chain_type, hydroxyls, label: &str, oxidation: Option<&str>| ChainKey {
        chain_type,
        carbons: 18,
        double_bonds: 1,
        hydroxyls,
        label: label.parse().unwrap(),
        oxidation: oxidation.map(str::to_string),
    };

    assert_eq!(key(ChainType::Acyl, 0, "", None).to_string(), "18:1");
    assert_eq!(key(ChainType::Acyl, 1, "", None).to_string(), "18:1;O");
    assert_eq!(key(ChainType::Acyl, 2, "", Some("OOH")).to_string(), "18:1;O2;(OOH)");
    assert_eq!(key(ChainType::Alkyl, 0, "", None).to_string(), "O-18:1");
    assert_eq!(key(ChainType::Alkenyl, 0, "", None).to_string(), "P-18:1");
    assert_eq!(key(ChainType::Lcb, 2, "", None).to_string(), "d18:1");
    assert_eq!(key(ChainType::Lcb, 3, "", None).to_string(), "t18:1");
    assert_eq!(key(ChainType::Lcb, 4, "", None).to_string(), "LCB18:1;O4");
    assert_eq!(key(ChainType::Acyl, 0, "D7", None).to_string(), "D7-18:1");
}

#[test]
fn test_hydroxyl_and_oxidation_ids_differ() {
    let formula: ElementalFormula = "C16H32O3".parse().unwrap();
    let key = |hydroxyls, oxidation: Option<&str>| ChainKey {
        chain_type: ChainType::Acyl,
        carbons: 16,
        double_bonds: 0,
        hydroxyls,
        label: Default::default(),
        oxidation: oxidation.map(str::to_string),
    };

    let hydroxylated = Chain::new(key(1, None), formula.clone());
    let oxidized = Chain::new(key(0, Some("O")), formula);
    assert_eq!(hydroxylated.id().as_str(), "16:0;O");
    assert_eq!(oxidized.id().as_str(), "16:0;(O)");
    assert_ne!(hydroxylated.id(), oxidized.id());

    let both = Chain::new(key(1, Some("O")), "C16H32O4".parse().unwrap());
    let ids: std::collections::BTreeSet<&ChainId> =
        [hydroxylated.id(), oxidized.id(), both.id()].into_iter().collect();
    assert_eq!(ids.len(), 3);
}

#[test]
fn test_chain_mass_from_formula() {
    let chain = acyl(16, 0, "C16H32O2").to_chain().unwrap();
    let formula: ElementalFormula = "C16H32O2".parse().unwrap();
    assert_eq!(chain.id().as_str(), "16:0");
    assert!((chain.monoisotopic_mass() - formula.monoisotopic_mass()).abs() < 1e-12);
}

#[test]
fn test_label_must_be_part_of_formula() {
    let mut entry = acyl(18, 1, "C18H27D7O2");
    entry.label = "D7".parse().unwrap();
    assert!(entry.to_chain().is_ok());

    entry.label = "D9".parse().unwrap();
    assert!(entry.to_chain().is_err());
}

#[test]
fn test_library_lookup_by_slot() {
    let mut libraries = ChainLibraries::new();
    let mut labelled = acyl(18, 1, "C18H27D7O2");
    labelled.label = "D7".parse().unwrap();
    libraries.insert(
        "fa",
        vec![acyl(16, 0, "C16H32O2"), acyl(18, 1, "C18H34O2"), labelled],
    );

    let library = libraries.chains_by_type("fa").unwrap();
    assert_eq!(library.len(), 3);

    let slot = SlotKey {
        chain_type: ChainType::Acyl,
        carbons: 18,
        double_bonds: 1,
        hydroxyls: 0,
    };
    let variants: Vec<String> = library
        .variants(&slot)
        .iter()
        .map(|c| c.id().to_string())
        .collect();
    assert_eq!(variants, vec!["18:1", "D7-18:1"]);

    let pairs: Vec<(u32, u32)> = library.carbon_double_bond_pairs().into_iter().collect();
    assert_eq!(pairs, vec![(16, 0), (18, 1)]);

    assert!(matches!(
        libraries.chains_by_type("lcb"),
        Err(LibraryError::NotFound(name)) if name == "lcb"
    ));
}

#[test]
fn test_plausible_for_analyte() {
    let mut libraries = ChainLibraries::new();
    libraries.insert("fa", vec![acyl(16, 0, "C16H32O2"), acyl(40, 0, "C40H80O2")]);
    let library = libraries.chains_by_type("fa").unwrap();

    let analyte: ElementalFormula = "C42H83NO8P".parse().unwrap();
    let plausible = library.plausible_for(&analyte);
    assert_eq!(plausible.len(), 2);

    let small: ElementalFormula = "C30H60NO8P".parse().unwrap();
    let plausible = library.plausible_for(&small);
    assert_eq!(plausible.len(), 1);
    assert_eq!(plausible.chains().next().unwrap().id().as_str(), "16:0");
}

#[test]
fn test_ether_variants() {
    let mut libraries = ChainLibraries::new();
    libraries.insert("fa", vec![acyl(16, 0, "C16H32O2")]);
    let library = libraries.chains_by_type("fa").unwrap().with_ether_variants();

    assert_eq!(library.len(), 3);
    let alkyl = library.by_type_and_hydroxyls(ChainType::Alkyl, 0);
    assert_eq!(alkyl[0].id().as_str(), "O-16:0");
    assert_eq!(alkyl[0].formula().to_string(), "C16H34O");

    let alkenyl = library.by_type_and_hydroxyls(ChainType::Alkenyl, 0);
    assert_eq!(alkenyl[0].id().as_str(), "P-16:0");
    assert_eq!(alkenyl[0].formula().to_string(), "C16H32O");
}
