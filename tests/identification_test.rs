//! End-to-end identification through analysis documents

use std::fs::File;
use std::io::{BufReader, Write};

use lipidmsn::combinatorics::{partition_hydroxylation, CombinatoricsError};
use lipidmsn::prelude::*;
use tempfile::{tempdir, NamedTempFile};

const RULES: &str = r#"{
    "PC": {
        "topology": { "acyl": 2 },
        "head_fragments": [
            { "name": "HG", "target": "head", "formula": "C5H15NO4P", "mandatory": "always" }
        ],
        "chain_fragments": [
            { "name": "FA", "target": { "chain": "acyl" }, "formula": "$CHAIN-H", "charge": -1 }
        ],
        "position_intensity_rules": [
            {
                "name": "sn2",
                "bigger": { "source": "chain", "chain_type": "acyl", "position": 2, "fragment": "FA" },
                "smaller": { "source": "chain", "chain_type": "acyl", "position": 1, "fragment": "FA" }
            }
        ]
    }
}"#;

fn acyl(carbons: u32, double_bonds: u32) -> ChainEntry {
    ChainEntry {
        chain_type: ChainType::Acyl,
        carbons,
        double_bonds,
        hydroxyls: 0,
        label: IsotopeLabel::none(),
        oxidation: None,
        formula: format!("C{}H{}O2", carbons, 2 * carbons - 2 * double_bonds)
            .parse()
            .unwrap(),
    }
}

fn mz(formula: &str, charge: i32) -> f64 {
    formula.parse::<ElementalFormula>().unwrap().mz(charge).unwrap()
}

fn pc_34_1() -> AnalyteParameters {
    AnalyteParameters::new("PC", "+H", "C42H83NO8P".parse().unwrap(), 34, 1)
}

fn spectrum(head: f64, fa_16_0: f64, fa_18_1: f64) -> SpectrumPeaks {
    let mut peaks = SpectrumPeaks::new();
    peaks.add_peak(2, Centroid::new(mz("C5H15NO4P", 1), head));
    peaks.add_peak(2, Centroid::new(mz("C16H31O2", -1), fa_16_0));
    peaks.add_peak(2, Centroid::new(mz("C18H33O2", -1), fa_18_1));
    peaks
}

fn batch(spectra: Vec<SpectrumPeaks>) -> AnalysisBatch {
    let mut libraries = ChainLibraries::new();
    libraries.insert(
        "FA",
        vec![acyl(16, 0), acyl(18, 1), acyl(17, 0), acyl(17, 1)],
    );
    AnalysisBatch {
        rules: serde_json::from_str(RULES).unwrap(),
        libraries,
        analytes: spectra
            .into_iter()
            .map(|spectrum| AnalyteSpectra {
                analyte: pc_34_1(),
                spectrum,
            })
            .collect(),
    }
}

fn single(spectrum: SpectrumPeaks, config: &ScorerConfig) -> IdentificationResult {
    let mut outcomes = batch(vec![spectrum]).analyze_all(config);
    outcomes.remove(0).unwrap()
}

// ==================== Combinatorics ====================

#[test]
fn test_equivalent_chain_orders_collapse() {
    let batch = batch(Vec::new());
    let analyzer = MsnAnalyzer::new(&pc_34_1(), &batch.rules, &batch.libraries)
        .unwrap()
        .unwrap();

    let mut ids: Vec<&str> = analyzer.combinations().combinations().map(|c| c.id()).collect();
    ids.sort();
    assert_eq!(ids, vec!["16:0_18:1", "17:0_17:1"]);
}

#[test]
fn test_hydroxylation_feasibility() {
    let topology = ChainTopology {
        acyl: 1,
        lcb: 1,
        ..Default::default()
    };
    let range = HydroxylRange::new(0, 2);

    let distributions = partition_hydroxylation(3, &topology, range, range).unwrap();
    assert!(!distributions.is_empty());
    assert!(distributions.iter().all(|d| d.total_hydroxyls() == 3));

    let err = partition_hydroxylation(5, &topology, range, range).unwrap_err();
    assert!(matches!(
        err,
        CombinatoricsError::ConstraintUnsatisfiable { requested: 5, .. }
    ));
}

// ==================== Scoring ====================

#[test]
fn test_full_identification() {
    let result = single(spectrum(1.0e6, 1.0e5, 3.0e5), &ScorerConfig::default());

    assert_eq!(result.status, IdentificationStatus::PositionDetected);
    assert_eq!(result.valid_combinations, vec!["16:0_18:1"]);
    assert_eq!(result.species_names(), vec!["16:0/18:1"]);
    assert!(result.head_fragments.contains_key("HG"));
}

#[test]
fn test_missing_mandatory_head_fragment() {
    let result = single(spectrum(0.0, 1.0e5, 3.0e5), &ScorerConfig::default());

    assert_eq!(result.status, IdentificationStatus::DiscardHit);
    assert!(result.head_fragments.is_empty());
    assert!(result.valid_combinations.is_empty());
    assert!(result.diagnostics.is_none());
}

#[test]
fn test_debug_mode_keeps_final_status() {
    let plain = single(spectrum(0.0, 1.0e5, 3.0e5), &ScorerConfig::default());
    let debug = single(spectrum(0.0, 1.0e5, 3.0e5), &ScorerConfig::debugging());

    assert_eq!(debug.status, plain.status);
    assert!(!debug.diagnostics.as_ref().unwrap().is_empty());
}

#[test]
fn test_equal_evidence_leaves_positions_open() {
    let result = single(spectrum(1.0e6, 2.0e5, 2.0e5), &ScorerConfig::default());

    assert_eq!(result.status, IdentificationStatus::FragmentsDetected);
    let assignment = &result.position_assignments["16:0_18:1"];
    assert!(assignment.chains.iter().all(|c| c.position.is_none()));

    let json = serde_json::to_value(assignment).unwrap();
    assert_eq!(json["chains"][0]["position"], -1);
    assert_eq!(json["chains"][1]["position"], -1);
}

#[test]
fn test_class_without_rules() {
    let mut batch = batch(vec![SpectrumPeaks::new()]);
    batch.analytes[0].analyte =
        AnalyteParameters::new("TG", "+NH4", "C55H108NO6".parse().unwrap(), 52, 2);

    let outcomes = batch.analyze_all(&ScorerConfig::default());
    assert_eq!(
        outcomes[0].as_ref().unwrap().status,
        IdentificationStatus::NoMsnPresent
    );
}

// ==================== Documents ====================

#[test]
fn test_document_round_trip() {
    let original = batch(vec![
        spectrum(1.0e6, 1.0e5, 3.0e5),
        spectrum(0.0, 1.0e5, 3.0e5),
    ]);

    let mut file = NamedTempFile::new().unwrap();
    serde_json::to_writer(&mut file, &original).unwrap();
    file.flush().unwrap();

    let reader = BufReader::new(File::open(file.path()).unwrap());
    let loaded = AnalysisBatch::from_reader(reader).unwrap();
    assert_eq!(loaded.analytes.len(), 2);
    assert_eq!(loaded.analytes[0].analyte, original.analytes[0].analyte);
    assert_eq!(loaded.analytes[1].spectrum.peaks(2).len(), 3);

    let statuses: Vec<IdentificationStatus> = loaded
        .analyze_all(&ScorerConfig::default())
        .into_iter()
        .map(|outcome| outcome.unwrap().status)
        .collect();
    assert_eq!(
        statuses,
        vec![IdentificationStatus::PositionDetected, IdentificationStatus::DiscardHit]
    );
}

#[test]
fn test_results_round_trip() {
    let result = single(spectrum(1.0e6, 1.0e5, 3.0e5), &ScorerConfig::debugging());

    let dir = tempdir().unwrap();
    let path = dir.path().join("results.json");
    serde_json::to_writer_pretty(File::create(&path).unwrap(), &result).unwrap();

    let loaded: IdentificationResult =
        serde_json::from_reader(BufReader::new(File::open(&path).unwrap())).unwrap();
    assert_eq!(loaded.status, result.status);
    assert_eq!(loaded.species_names(), result.species_names());
    assert_eq!(loaded.valid_combinations, result.valid_combinations);
    assert_eq!(
        loaded.diagnostics.map(|d| d.len()),
        result.diagnostics.map(|d| d.len())
    );
}

#[test]
fn test_evidence_rows() {
    let result = single(spectrum(1.0e6, 1.0e5, 3.0e5), &ScorerConfig::default());
    let rows = result.evidence_rows();

    let owners: Vec<&str> = rows.iter().map(|r| r.owner.as_str()).collect();
    assert_eq!(owners, vec!["head", "16:0", "18:1"]);
    assert!(rows.iter().all(|r| r.ms_level == 2 && r.area > 0.0));
    assert!(rows
        .iter()
        .all(|r| r.status == IdentificationStatus::PositionDetected));
}
