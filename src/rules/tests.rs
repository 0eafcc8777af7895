use super::*;
use crate::chemistry::ElementalFormula;

fn formula(s: &str) -> ElementalFormula {
    s.parse().unwrap()
}

fn fragment(name: &str, target: FragmentTarget, expression: &str) -> FragmentRule {
    FragmentRule {
        name: name.to_string(),
        target,
        formula: expression.parse().unwrap(),
        charge: 1,
        ms_level: 2,
        mandatory: MandatoryPolicy::Optional,
        mandatory_by_hydroxyls: BTreeMap::new(),
        valid_hydroxyls: None,
    }
}

fn chain_term(fragment: &str, position: Option<usize>) -> FragmentTerm {
    FragmentTerm {
        source: FragmentSource::Chain {
            chain_type: ChainType::Acyl,
            position,
        },
        fragment: fragment.to_string(),
        factor: 1.0,
    }
}

fn pc_rules() -> ClassRules {
    ClassRules {
        topology: ChainTopology::acyl(2),
        head_fragments: vec![fragment("HG", FragmentTarget::Head, "C5H15NO4P")],
        chain_fragments: vec![
            fragment("FA-H", FragmentTarget::Chain(ChainType::Acyl), "$CHAIN-H"),
            fragment("LPC", FragmentTarget::Chain(ChainType::Acyl), "$PRECURSOR-$CHAIN+H2O"),
        ],
        ..Default::default()
    }
}

#[test]
fn test_expression_evaluation() {
    let expression: FormulaExpression = "$PRECURSOR-$CHAIN+H2O".parse().unwrap();
    assert!(expression.uses_chain());
    assert!(expression.uses_precursor());

    let result = expression
        .evaluate(&formula("C42H83NO8P"), Some(&formula("C16H32O2")))
        .unwrap();
    assert_eq!(result.to_string(), "C26H53NO7P");

    let leading: FormulaExpression = "-H+$CHAIN".parse().unwrap();
    let result = leading.evaluate(&formula("C1"), Some(&formula("C16H32O2"))).unwrap();
    assert_eq!(result.to_string(), "C16H31O2");
}

#[test]
fn test_expression_errors() {
    assert_eq!("".parse::<FormulaExpression>(), Err(ExpressionError::Empty));
    assert!(matches!(
        "$PRECURSOR-".parse::<FormulaExpression>(),
        Err(ExpressionError::DanglingOperator(_))
    ));
    assert!(matches!(
        "$PRECURSOR--H".parse::<FormulaExpression>(),
        Err(ExpressionError::DanglingOperator(_))
    ));
    assert!(matches!(
        "$ANALYTE".parse::<FormulaExpression>(),
        Err(ExpressionError::UnknownPlaceholder(name)) if name == "ANALYTE"
    ));
    assert!(matches!(
        "$PRECURSOR-Xy".parse::<FormulaExpression>(),
        Err(ExpressionError::Formula(_))
    ));

    let expression: FormulaExpression = "$CHAIN-H2O".parse().unwrap();
    assert_eq!(
        expression.evaluate(&formula("C5"), None),
        Err(ExpressionError::MissingChain)
    );
    // more oxygen removed than present
    let expression: FormulaExpression = "$CHAIN-O3".parse().unwrap();
    assert!(matches!(
        expression.evaluate(&formula("C5"), Some(&formula("C16H32O2"))),
        Err(ExpressionError::Formula(_))
    ));
}

#[test]
fn test_policy_and_hydroxyl_validity() {
    let mut rule = fragment("FA-H", FragmentTarget::Chain(ChainType::Acyl), "$CHAIN-H");
    rule.mandatory = MandatoryPolicy::Always;
    rule.mandatory_by_hydroxyls.insert(1, MandatoryPolicy::Optional);
    rule.valid_hydroxyls = Some([0, 1].into_iter().collect());

    assert_eq!(rule.policy_for(0), MandatoryPolicy::Always);
    assert_eq!(rule.policy_for(1), MandatoryPolicy::Optional);
    assert!(rule.is_valid_for(1));
    assert!(!rule.is_valid_for(2));
    assert!(rule.targets(ChainType::Acyl));
    assert!(!rule.targets(ChainType::Lcb));
}

#[test]
fn test_intensity_rule_scope_and_positions() {
    let same_chain = IntensityRule {
        name: "same".to_string(),
        bigger: chain_term("FA-H", None),
        smaller: chain_term("LPC", None),
        mandatory: false,
        mode: ComparisonMode::Absolute,
    };
    assert_eq!(same_chain.scope(), RuleScope::SameChain);
    assert_eq!(same_chain.position_pair_id(), "");

    let pairwise = IntensityRule {
        name: "sn".to_string(),
        bigger: chain_term("LPC", Some(2)),
        smaller: chain_term("LPC", Some(1)),
        mandatory: true,
        mode: ComparisonMode::Absolute,
    };
    assert_eq!(pairwise.scope(), RuleScope::Pairwise);
    assert_eq!(pairwise.positions(), vec![1, 2]);
    assert_eq!(pairwise.position_pair_id(), "1-2");
}

#[test]
fn test_fragment_term_json() {
    let json = r#"{
        "name": "sn2",
        "bigger": { "source": "chain", "chain_type": "acyl", "position": 2, "fragment": "LPC" },
        "smaller": { "source": "base_peak", "factor": 0.5 },
        "mandatory": true
    }"#;
    let rule: IntensityRule = serde_json::from_str(json).unwrap();
    assert_eq!(rule.bigger.position(), Some(2));
    assert_eq!(rule.smaller.source, FragmentSource::BasePeak);
    assert_eq!(rule.smaller.factor, 0.5);
    assert_eq!(rule.bigger.factor, 1.0);
    assert_eq!(rule.mode, ComparisonMode::Absolute);
}

#[test]
fn test_class_rules_json_defaults() {
    let json = r#"{
        "topology": { "acyl": 2 },
        "head_fragments": [
            { "name": "HG", "target": "head", "formula": "C5H15NO4P", "mandatory": "always" }
        ],
        "chain_fragments": [
            { "name": "FA-H", "target": { "chain": "acyl" }, "formula": "$CHAIN-H", "charge": -1 }
        ]
    }"#;
    let rules: ClassRules = serde_json::from_str(json).unwrap();
    assert_eq!(rules.fa_library, "FA");
    assert_eq!(rules.head_fragments[0].mandatory, MandatoryPolicy::Always);
    assert_eq!(rules.head_fragments[0].ms_level, 2);
    assert_eq!(rules.chain_fragments[0].charge, -1);
    assert!(rules.validate("PC").is_ok());
    assert!(rules.has_multiple_positions());
}

#[test]
fn test_validate_rejects_structural_problems() {
    let mut rules = pc_rules();
    rules.chain_fragments[0].charge = 0;
    assert!(matches!(
        rules.validate("PC"),
        Err(RuleError::Violation { rule, .. }) if rule == "FA-H"
    ));

    let mut rules = pc_rules();
    rules.head_fragments[0].formula = "$PRECURSOR-$CHAIN".parse().unwrap();
    assert!(rules.validate("PC").is_err());

    let mut rules = pc_rules();
    rules.head_fragments[0].ms_level = 1;
    assert!(rules.validate("PC").is_err());

    let mut rules = pc_rules();
    rules.chain_intensity_rules.push(IntensityRule {
        name: "unknown".to_string(),
        bigger: chain_term("FA-H", None),
        smaller: chain_term("missing", None),
        mandatory: false,
        mode: ComparisonMode::Absolute,
    });
    assert!(rules.validate("PC").is_err());

    let mut rules = pc_rules();
    rules.chain_intensity_rules.push(IntensityRule {
        name: "relative base peak".to_string(),
        bigger: chain_term("FA-H", None),
        smaller: FragmentTerm {
            source: FragmentSource::BasePeak,
            fragment: String::new(),
            factor: 0.1,
        },
        mandatory: false,
        mode: ComparisonMode::Relative,
    });
    assert!(matches!(
        rules.validate("PC"),
        Err(RuleError::Violation { reason, .. }) if reason.contains("relative")
    ));

    let mut rules = pc_rules();
    rules.position_intensity_rules.push(IntensityRule {
        name: "sn3".to_string(),
        bigger: chain_term("LPC", Some(3)),
        smaller: chain_term("LPC", Some(1)),
        mandatory: false,
        mode: ComparisonMode::Absolute,
    });
    assert!(rules.validate("PC").is_err());

    let mut rules = pc_rules();
    rules.chain_cutoff = 1.5;
    assert!(rules.validate("PC").is_err());
}

#[test]
fn test_rule_set_lookup() {
    let mut rule_set = RuleSet::new();
    rule_set.insert("PC", pc_rules());
    let mut adduct_specific = pc_rules();
    adduct_specific.chain_cutoff = 0.2;
    rule_set.insert("PC_+HCOO", adduct_specific);

    assert_eq!(rule_set.chain_cutoff("PC", "+H").unwrap(), 0.0);
    assert_eq!(rule_set.chain_cutoff("PC", "+HCOO").unwrap(), 0.2);
    assert_eq!(rule_set.head_fragment_rules("PC", "+H").unwrap().len(), 1);
    assert_eq!(rule_set.chain_topology("PC", "+H").unwrap().acyl, 2);

    let absent = rule_set.class_rules("TG", "+NH4").unwrap_err();
    assert!(absent.is_absent());
    assert!(rule_set.validate().is_ok());
}

#[test]
fn test_positions_for_chain_type() {
    let mut rules = pc_rules();
    assert_eq!(rules.positions_for(ChainType::Acyl, 2), BTreeSet::from([1, 2]));

    rules.topology = ChainTopology {
        lcb: 1,
        acyl: 1,
        ..Default::default()
    };
    rules.lcb_library = Some("LCB".to_string());
    rules.allowed_positions.insert(ChainType::Lcb, [1].into_iter().collect());
    rules.allowed_positions.insert(ChainType::Acyl, [2].into_iter().collect());
    assert_eq!(rules.positions_for(ChainType::Lcb, 2), BTreeSet::from([1]));
    assert!(rules.has_multiple_positions());

    rules.allowed_positions.insert(ChainType::Acyl, [1].into_iter().collect());
    assert!(!rules.has_multiple_positions());
}
