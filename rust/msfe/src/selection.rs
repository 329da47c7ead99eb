use crate::models::{
    ScanCategory,
    Spectrum,
};
use serde::{
    Deserialize,
    Serialize,
};

/// Indices of the `n` scans with the highest total ion current, in scan order.
///
/// Scans with the same TIC are ranked by position, earlier first.
///
/// ```
/// use msfe::models::Spectrum;
/// use msfe::selection::select_best_tic_scans;
///
/// let scans: Vec<Spectrum> = [3.0, 9.0, 1.0, 9.0]
///     .iter()
///     .map(|i| Spectrum::try_new(vec![100.0], vec![*i]).unwrap())
///     .collect();
/// assert_eq!(select_best_tic_scans(&scans, 2), vec![1, 3]);
/// assert_eq!(select_best_tic_scans(&scans, 10), vec![0, 1, 2, 3]);
/// ```
pub fn select_best_tic_scans(spectra: &[Spectrum], n: usize) -> Vec<usize> {
    let mut ranked: Vec<(usize, f64)> = spectra
        .iter()
        .enumerate()
        .map(|(i, s)| (i, s.total_ion_current()))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    let mut out: Vec<usize> = ranked.into_iter().take(n).map(|(i, _)| i).collect();
    out.sort_unstable();
    out
}

/// Which scans of a run are processed for each category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSelection {
    pub normal: Vec<usize>,
    pub chemical_noise: Vec<usize>,
    pub instrument_noise: Vec<usize>,
}

impl ScanSelection {
    pub fn indices_for(&self, category: ScanCategory) -> &[usize] {
        match category {
            ScanCategory::Normal => &self.normal,
            ScanCategory::ChemicalNoise => &self.chemical_noise,
            ScanCategory::InstrumentNoise => &self.instrument_noise,
        }
    }
}

/// How the binary picks scans: the best TIC scans for the main features and
/// fixed indices for the noise categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub number_of_normal_scans: usize,
    pub chemical_noise_scans: Vec<usize>,
    pub instrument_noise_scans: Vec<usize>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            number_of_normal_scans: 3,
            chemical_noise_scans: Vec::new(),
            instrument_noise_scans: Vec::new(),
        }
    }
}

impl SelectionConfig {
    pub fn select(&self, spectra: &[Spectrum]) -> ScanSelection {
        ScanSelection {
            normal: select_best_tic_scans(spectra, self.number_of_normal_scans),
            chemical_noise: self.chemical_noise_scans.clone(),
            instrument_noise: self.instrument_noise_scans.clone(),
        }
    }
}
