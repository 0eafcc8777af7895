use std::collections::BTreeMap;

use super::*;
use crate::chains::{ChainKey, ChainType};

fn rule(name: &str, target: FragmentTarget, expression: &str, charge: i32, policy: MandatoryPolicy) -> FragmentRule {
    FragmentRule {
        name: name.to_string(),
        target,
        formula: expression.parse().unwrap(),
        charge,
        ms_level: 2,
        mandatory: policy,
        mandatory_by_hydroxyls: BTreeMap::new(),
        valid_hydroxyls: None,
    }
}

fn palmitate() -> Chain {
    let key = ChainKey {
        chain_type: ChainType::Acyl,
        carbons: 16,
        double_bonds: 0,
        hydroxyls: 0,
        label: Default::default(),
        oxidation: None,
    };
    Chain::new(key, "C16H32O2".parse().unwrap())
}

#[test]
fn test_head_fragments_partitioned() {
    let precursor: ElementalFormula = "C42H83NO8P".parse().unwrap();
    let rules = vec![
        rule("HG", FragmentTarget::Head, "C5H15NO4P", 1, MandatoryPolicy::Always),
        rule("HG-H2O", FragmentTarget::Head, "$PRECURSOR-H2O", 1, MandatoryPolicy::Quant),
        rule("class", FragmentTarget::Head, "C5H13NO3P", 1, MandatoryPolicy::Class),
        rule("FA-H", FragmentTarget::Chain(ChainType::Acyl), "$CHAIN-H", -1, MandatoryPolicy::Always),
    ];

    let predictor = FragmentPredictor::new("PC", &precursor);
    let set = predictor.head(&rules, 0).unwrap();
    assert_eq!(set.mandatory.len(), 1);
    assert_eq!(set.optional.len(), 2);
    assert!(set.has_policy(MandatoryPolicy::Class));

    let head = set.get("HG").unwrap();
    let expected = head.formula.mz(1).unwrap();
    assert_eq!(head.mz, expected);

    let set = predictor.with_quantification(true).head(&rules, 0).unwrap();
    let mandatory: Vec<&str> = set.mandatory.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(mandatory, vec!["HG", "HG-H2O"]);
}

#[test]
fn test_chain_fragments_filtered_by_type_and_hydroxyls() {
    let precursor: ElementalFormula = "C42H83NO8P".parse().unwrap();
    let mut hydroxylated_only = rule(
        "FA-H2O",
        FragmentTarget::Chain(ChainType::Acyl),
        "$CHAIN-H3O",
        -1,
        MandatoryPolicy::Optional,
    );
    hydroxylated_only.valid_hydroxyls = Some([1, 2].into_iter().collect());
    let rules = vec![
        rule("FA-H", FragmentTarget::Chain(ChainType::Acyl), "$CHAIN-H", -1, MandatoryPolicy::Always),
        rule("LCB", FragmentTarget::Chain(ChainType::Lcb), "$CHAIN-H2O", 1, MandatoryPolicy::Always),
        hydroxylated_only,
    ];

    let set = FragmentPredictor::new("PC", &precursor)
        .chain(&rules, &palmitate())
        .unwrap();
    assert_eq!(set.len(), 1);
    let fragment = set.get("FA-H").unwrap();
    assert_eq!(fragment.formula.to_string(), "C16H31O2");
    assert!((fragment.mz - 255.2330).abs() < 1e-3);
    assert_eq!(fragment.charge, -1);
}

#[test]
fn test_hydroxyl_policy_override() {
    let precursor: ElementalFormula = "C42H83NO9P".parse().unwrap();
    let mut fa = rule("FA-H", FragmentTarget::Chain(ChainType::Acyl), "$CHAIN-H", -1, MandatoryPolicy::Always);
    fa.mandatory_by_hydroxyls.insert(1, MandatoryPolicy::Optional);

    let key = ChainKey {
        hydroxyls: 1,
        ..palmitate().key().clone()
    };
    let hydroxylated = Chain::new(key, "C16H32O3".parse().unwrap());

    let set = FragmentPredictor::new("PC", &precursor)
        .chain(&[fa], &hydroxylated)
        .unwrap();
    assert!(set.mandatory.is_empty());
    assert_eq!(set.optional[0].policy, MandatoryPolicy::Optional);
}

#[test]
fn test_negative_fragment_formula_is_rule_violation() {
    let precursor: ElementalFormula = "C42H83NO8P".parse().unwrap();
    let rules = vec![rule(
        "broken",
        FragmentTarget::Chain(ChainType::Acyl),
        "$CHAIN-C20",
        -1,
        MandatoryPolicy::Always,
    )];

    let err = FragmentPredictor::new("PC", &precursor)
        .chain(&rules, &palmitate())
        .unwrap_err();
    assert!(matches!(err, RuleError::Violation { ref class, ref rule, .. } if class == "PC" && rule == "broken"));
}
