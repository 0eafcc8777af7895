use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::PeakError;
use crate::chemistry::ElementalFormula;

/// A fragment measurement request
#[derive(Debug, Clone, Copy)]
pub struct PeakQuery<'a> {
    /// Fragment name
    pub name: &'a str,
    /// Theoretical m/z
    pub mz: f64,
    /// Fragment formula
    pub formula: &'a ElementalFormula,
    /// MS level to measure at
    pub ms_level: u8,
    /// Ion charge
    pub charge: i32,
}

/// Outcome class of a peak-area query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    /// An area was measured
    Ok,
    /// No signal at the expected m/z
    NothingThere,
    /// Extraction failed for another reason
    Failed(String),
}

/// Measured fragment area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Probe {
    /// Integrated area
    pub area: f64,
    /// Measurement outcome
    pub status: ProbeStatus,
    /// Whether the signal is attributed to a different co-eluting species
    pub from_other_species: bool,
    /// MS level the area was measured at
    pub ms_level: u8,
    /// Observed m/z of the most intense centroid behind the area, when the service reports one
    #[serde(default)]
    pub peak_mz: Option<f64>,
}

impl Probe {
    /// A successful measurement
    pub fn found(area: f64, ms_level: u8) -> Self {
        Self {
            area,
            status: ProbeStatus::Ok,
            from_other_species: false,
            ms_level,
            peak_mz: None,
        }
    }

    /// No signal
    pub fn nothing_there(ms_level: u8) -> Self {
        Self {
            area: 0.0,
            status: ProbeStatus::NothingThere,
            from_other_species: false,
            ms_level,
            peak_mz: None,
        }
    }

    /// Whether the measurement succeeded with a positive area
    pub fn is_ok(&self) -> bool {
        self.status == ProbeStatus::Ok && self.area > 0.0
    }
}

/// Fragment area extraction
pub trait PeakAreaService {
    /// Measure the area of one fragment
    fn calculate_area(&self, query: &PeakQuery<'_>) -> Result<Probe, PeakError>;

    /// MS levels with spectra for the analyte
    fn ms_levels(&self) -> BTreeSet<u8>;

    /// Total ion intensity at `ms_level`
    fn total_intensity(&self, ms_level: u8) -> f64;
}

/// Base peak lookup
pub trait BasePeakService {
    /// Base peak intensity for each requested MS level that has spectra
    fn extract_base_peak_values(&self, levels: &BTreeSet<u8>) -> Result<BTreeMap<u8, f64>, PeakError>;
}

/// Single centroided peak
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    /// Peak m/z
    pub mz: f64,
    /// Peak intensity
    pub intensity: f64,
    /// Whether the peak belongs to a co-eluting species
    #[serde(default)]
    pub other_species: bool,
}

impl Centroid {
    /// Peak owned by the analyte
    pub fn new(mz: f64, intensity: f64) -> Self {
        Self {
            mz,
            intensity,
            other_species: false,
        }
    }
}

fn default_tolerance_ppm() -> f64 {
    10.0
}

/// In-memory centroided MSn spectra of one analyte, serving as both peak-area and
/// base-peak service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectrumPeaks {
    /// Matching tolerance in ppm
    #[serde(default = "default_tolerance_ppm")]
    tolerance_ppm: f64,
    /// Centroids by MS level
    #[serde(default)]
    spectra: BTreeMap<u8, Vec<Centroid>>,
}

impl Default for SpectrumPeaks {
    fn default() -> Self {
        Self {
            tolerance_ppm: default_tolerance_ppm(),
            spectra: BTreeMap::new(),
        }
    }
}

impl SpectrumPeaks {
    /// Empty spectra with the default 10 ppm tolerance
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the matching tolerance
    pub fn with_tolerance(mut self, tolerance_ppm: f64) -> Result<Self, PeakError> {
        if !tolerance_ppm.is_finite() || tolerance_ppm <= 0.0 {
            return Err(PeakError::InvalidTolerance(tolerance_ppm));
        }
        self.tolerance_ppm = tolerance_ppm;
        Ok(self)
    }

    /// Matching tolerance in ppm
    pub fn tolerance_ppm(&self) -> f64 {
        self.tolerance_ppm
    }

    /// Add a centroid at `ms_level`
    pub fn add_peak(&mut self, ms_level: u8, centroid: Centroid) {
        self.spectra.entry(ms_level).or_default().push(centroid);
    }

    /// Centroids at `ms_level`
    pub fn peaks(&self, ms_level: u8) -> &[Centroid] {
        self.spectra.get(&ms_level).map(Vec::as_slice).unwrap_or(&[])
    }

    fn matching(&self, mz: f64, ms_level: u8) -> impl Iterator<Item = &Centroid> + '_ {
        let window = mz.abs() * self.tolerance_ppm * 1e-6;
        self.peaks(ms_level)
            .iter()
            .filter(move |c| (c.mz - mz).abs() <= window)
    }
}

impl PeakAreaService for SpectrumPeaks {
    fn calculate_area(&self, query: &PeakQuery<'_>) -> Result<Probe, PeakError> {
        if !query.mz.is_finite() {
            return Err(PeakError::Service {
                fragment: query.name.to_string(),
                ms_level: query.ms_level,
                reason: format!("non-finite m/z {}", query.mz),
            });
        }
        let mut area = 0.0;
        let mut other_species = false;
        let mut apex: Option<&Centroid> = None;
        for centroid in self.matching(query.mz, query.ms_level) {
            area += centroid.intensity;
            other_species |= centroid.other_species;
            if apex.map_or(true, |a| centroid.intensity > a.intensity) {
                apex = Some(centroid);
            }
        }
        if area <= 0.0 {
            return Ok(Probe::nothing_there(query.ms_level));
        }
        Ok(Probe {
            from_other_species: other_species,
            peak_mz: apex.map(|c| c.mz),
            ..Probe::found(area, query.ms_level)
        })
    }

    fn ms_levels(&self) -> BTreeSet<u8> {
        self.spectra
            .iter()
            .filter(|(_, peaks)| !peaks.is_empty())
            .map(|(level, _)| *level)
            .collect()
    }

    fn total_intensity(&self, ms_level: u8) -> f64 {
        self.peaks(ms_level).iter().map(|c| c.intensity).sum()
    }
}

impl BasePeakService for SpectrumPeaks {
    fn extract_base_peak_values(&self, levels: &BTreeSet<u8>) -> Result<BTreeMap<u8, f64>, PeakError> {
        Ok(levels
            .iter()
            .filter_map(|level| {
                self.peaks(*level)
                    .iter()
                    .map(|c| c.intensity)
                    .reduce(f64::max)
                    .map(|max| (*level, max))
            })
            .collect())
    }
}
