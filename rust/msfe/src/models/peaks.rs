use crate::catalogue::IonEntry;

/// Outcome of matching one expected ion against the centroids of a scan.
#[derive(Debug, Clone, Copy)]
pub struct ActualPeak<'a> {
    pub entry: &'a IonEntry,
    /// Centroid index in the spectrum, `None` when the ion is absent.
    pub index: Option<usize>,
    /// The matched centroid sits on a plateau of equal intensities.
    pub is_apex_flat: bool,
}

impl<'a> ActualPeak<'a> {
    pub fn absent(entry: &'a IonEntry) -> Self {
        Self {
            entry,
            index: None,
            is_apex_flat: false,
        }
    }

    pub fn is_present(&self) -> bool {
        self.index.is_some()
    }

    pub fn id(&self) -> &'a str {
        &self.entry.id
    }

    pub fn expected_mz(&self) -> f64 {
        self.entry.expected_mz
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoodnessOfFit {
    pub reduced_chi_square: f64,
    pub aic: f64,
    pub bic: f64,
}

impl GoodnessOfFit {
    pub fn to_array(&self) -> [f64; 3] {
        [self.reduced_chi_square, self.aic, self.bic]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitInfo {
    pub model: &'static str,
    pub goodness_of_fit: GoodnessOfFit,
    /// |fitted apex - expected m/z|
    pub fit_theory_absolute_ma: f64,
    pub fit_theory_ppm: f64,
    /// raw apex m/z - fitted apex m/z
    pub signal_fit_absolute_ma: f64,
    pub signal_fit_ppm: f64,
    /// Width of the fit at half height.
    pub resolution: f64,
    pub raw_intensity: Vec<f64>,
    pub is_apex_flat: bool,
}

/// Dense resampling of a fitted peak.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedCurve {
    pub mz: Vec<f64>,
    pub intensity: Vec<f64>,
    pub info: FitInfo,
}

impl FittedCurve {
    /// Index of the highest point of the curve (first one on ties).
    pub fn apex_index(&self) -> usize {
        let mut best = 0;
        for (i, y) in self.intensity.iter().enumerate() {
            if *y > self.intensity[best] {
                best = i;
            }
        }
        best
    }

    pub fn apex_mz(&self) -> f64 {
        self.mz[self.apex_index()]
    }

    pub fn max_intensity(&self) -> f64 {
        self.intensity[self.apex_index()]
    }

    pub fn left_mz(&self) -> f64 {
        self.mz[0]
    }

    pub fn right_mz(&self) -> f64 {
        self.mz[self.mz.len() - 1]
    }
}

/// Fit result for one expected ion. `curve` is `None` for ions that were
/// absent or whose fit failed.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakFit<'a> {
    pub entry: &'a IonEntry,
    pub curve: Option<FittedCurve>,
}

impl<'a> PeakFit<'a> {
    pub fn null(entry: &'a IonEntry) -> Self {
        Self { entry, curve: None }
    }

    pub fn is_fitted(&self) -> bool {
        self.curve.is_some()
    }

    pub fn expected_mz(&self) -> f64 {
        self.entry.expected_mz
    }

    pub fn peak_id(&self) -> &'a str {
        &self.entry.id
    }
}
