//! Numeric configuration of the extraction.
//!
//! Every field has a default so a configuration file only needs to mention
//! what it changes:
//!
//! ```
//! use msfe::ExtractionConfig;
//!
//! let config: ExtractionConfig =
//!     serde_json::from_str(r#"{"peak_features": {"max_subsequent_peaks": 3}}"#).unwrap();
//! assert_eq!(config.peak_features.max_subsequent_peaks, 3);
//! assert_eq!(config.fitting.curve_points, 5001);
//! config.validate().unwrap();
//! ```

use crate::errors::MsfeError;
use crate::models::ScanCategory;
use serde::{
    Deserialize,
    Serialize,
};

/// M/z tolerance used to decide whether a centroid matches an expected ion.
///
/// Same convention as the rest of the tolerances: both values are positive,
/// `(1, 1)` on 10 means the range `(9, 11)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum MzTolerance {
    #[serde(rename = "da")]
    Absolute((f64, f64)),
    #[serde(rename = "ppm")]
    Ppm((f64, f64)),
}

impl Default for MzTolerance {
    fn default() -> Self {
        MzTolerance::Ppm((20.0, 20.0))
    }
}

impl MzTolerance {
    /// Inclusive `(low, high)` m/z window around `mz`.
    ///
    /// ```
    /// use msfe::config::MzTolerance;
    ///
    /// let (low, high) = MzTolerance::Ppm((20.0, 20.0)).mz_range(500.0);
    /// assert!((low - 499.99).abs() < 1e-9);
    /// assert!((high - 500.01).abs() < 1e-9);
    /// ```
    pub fn mz_range(&self, mz: f64) -> (f64, f64) {
        match self {
            MzTolerance::Absolute((low, high)) => (mz - low, mz + high),
            MzTolerance::Ppm((low, high)) => (mz - mz * low / 1e6, mz + mz * high / 1e6),
        }
    }

    pub fn contains(&self, expected_mz: f64, observed_mz: f64) -> bool {
        let (low, high) = self.mz_range(expected_mz);
        low <= observed_mz && observed_mz <= high
    }

    fn is_valid(&self) -> bool {
        let (a, b) = match self {
            MzTolerance::Absolute(x) | MzTolerance::Ppm(x) => *x,
        };
        a.is_finite() && b.is_finite() && a >= 0.0 && b >= 0.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CentroidingConfig {
    /// Minimum height of a centroid in normal and chemical noise scans.
    pub min_normal_peak_intensity: f64,
    /// Minimum height of a centroid in instrument noise scans.
    pub min_background_peak_intensity: f64,
}

impl Default for CentroidingConfig {
    fn default() -> Self {
        Self {
            min_normal_peak_intensity: 100.0,
            min_background_peak_intensity: 10.0,
        }
    }
}

impl CentroidingConfig {
    pub fn threshold_for(&self, category: ScanCategory) -> f64 {
        match category {
            ScanCategory::InstrumentNoise => self.min_background_peak_intensity,
            _ => self.min_normal_peak_intensity,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatchingConfig {
    pub mz_tolerance: MzTolerance,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FittingConfig {
    /// Raw points taken on each side of the centroid for the fit.
    pub window_points: usize,
    /// The fitted curve is resampled over `apex +- factor * resolution`.
    pub peak_region_factor: f64,
    pub curve_points: usize,
    pub max_iterations: usize,
    /// Relative chi-square reduction below which the fit is converged.
    pub ftol: f64,
    /// Relative parameter step below which the fit is converged.
    pub xtol: f64,
}

impl Default for FittingConfig {
    fn default() -> Self {
        Self {
            window_points: 4,
            peak_region_factor: 3.0,
            curve_points: 5001,
            max_iterations: 200,
            ftol: 1e-10,
            xtol: 1e-10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PeakFeatureConfig {
    pub saturation_intensity: f64,
    /// Fractions of the apex height the peak widths are measured at.
    pub width_levels: Vec<f64>,
    pub max_subsequent_peaks: usize,
}

impl Default for PeakFeatureConfig {
    fn default() -> Self {
        Self {
            saturation_intensity: 1_000_000.0,
            width_levels: vec![0.2, 0.5, 0.8],
            max_subsequent_peaks: 5,
        }
    }
}

/// Contiguous frames `[start + i * size, start + (i + 1) * size)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FrameLayout {
    pub start_mz: f64,
    pub frame_size: f64,
    pub number_of_frames: usize,
}

impl FrameLayout {
    pub fn frames(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        (0..self.number_of_frames).map(|i| {
            (
                self.start_mz + i as f64 * self.frame_size,
                self.start_mz + (i + 1) as f64 * self.frame_size,
            )
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FramesConfig {
    pub normal: FrameLayout,
    pub chemical_noise: FrameLayout,
    pub instrument_noise: FrameLayout,
    /// Percentile levels, in [0, 100].
    pub percentiles: Vec<f64>,
    pub top_peaks: usize,
    /// Value used in place of intensities of frames with no signal.
    pub no_signal_intensity: f64,
}

impl Default for FramesConfig {
    fn default() -> Self {
        Self {
            normal: FrameLayout {
                start_mz: 50.0,
                frame_size: 50.0,
                number_of_frames: 19,
            },
            chemical_noise: FrameLayout {
                start_mz: 50.0,
                frame_size: 50.0,
                number_of_frames: 19,
            },
            instrument_noise: FrameLayout {
                start_mz: 50.0,
                frame_size: 50.0,
                number_of_frames: 19,
            },
            percentiles: vec![25.0, 50.0, 75.0],
            top_peaks: 10,
            no_signal_intensity: 0.0,
        }
    }
}

impl FramesConfig {
    pub fn layout_for(&self, category: ScanCategory) -> &FrameLayout {
        match category {
            ScanCategory::Normal => &self.normal,
            ScanCategory::ChemicalNoise => &self.chemical_noise,
            ScanCategory::InstrumentNoise => &self.instrument_noise,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExtractionConfig {
    pub centroiding: CentroidingConfig,
    pub matching: MatchingConfig,
    pub fitting: FittingConfig,
    pub peak_features: PeakFeatureConfig,
    pub frames: FramesConfig,
    /// Written in place of missing values when a row is serialized.
    pub missing_value: f64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            centroiding: CentroidingConfig::default(),
            matching: MatchingConfig::default(),
            fitting: FittingConfig::default(),
            peak_features: PeakFeatureConfig::default(),
            frames: FramesConfig::default(),
            missing_value: -1.0,
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> MsfeError {
    MsfeError::InvalidConfig {
        field,
        reason: reason.into(),
    }
}

impl ExtractionConfig {
    pub fn validate(&self) -> Result<(), MsfeError> {
        let c = &self.centroiding;
        if !(c.min_normal_peak_intensity.is_finite() && c.min_background_peak_intensity.is_finite())
        {
            return Err(invalid("centroiding", "thresholds must be finite"));
        }
        if !self.matching.mz_tolerance.is_valid() {
            return Err(invalid(
                "matching.mz_tolerance",
                "must be finite and non-negative",
            ));
        }

        let f = &self.fitting;
        if f.window_points < 2 {
            return Err(invalid("fitting.window_points", "must be at least 2"));
        }
        if !(f.peak_region_factor.is_finite() && f.peak_region_factor > 0.0) {
            return Err(invalid("fitting.peak_region_factor", "must be positive"));
        }
        if f.curve_points < 3 {
            return Err(invalid("fitting.curve_points", "must be at least 3"));
        }
        if f.max_iterations == 0 {
            return Err(invalid("fitting.max_iterations", "must be positive"));
        }

        let p = &self.peak_features;
        if p.width_levels.is_empty() || p.width_levels.iter().any(|x| !(*x > 0.0 && *x < 1.0)) {
            return Err(invalid(
                "peak_features.width_levels",
                "must be a non-empty list of fractions in (0, 1)",
            ));
        }

        let fr = &self.frames;
        for category in ScanCategory::ALL {
            let layout = fr.layout_for(category);
            if !(layout.frame_size.is_finite() && layout.frame_size > 0.0) {
                return Err(invalid("frames.frame_size", "must be positive"));
            }
            if !layout.start_mz.is_finite() {
                return Err(invalid("frames.start_mz", "must be finite"));
            }
        }
        if fr.percentiles.iter().any(|x| !(0.0..=100.0).contains(x)) {
            return Err(invalid("frames.percentiles", "must be within [0, 100]"));
        }
        if fr.top_peaks == 0 {
            return Err(invalid("frames.top_peaks", "must be positive"));
        }
        if !self.missing_value.is_finite() {
            return Err(invalid("missing_value", "must be finite"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        ExtractionConfig::default().validate().unwrap();
    }

    #[test]
    fn test_invalid_width_level() {
        let mut config = ExtractionConfig::default();
        config.peak_features.width_levels = vec![0.5, 1.5];
        assert!(matches!(
            config.validate(),
            Err(MsfeError::InvalidConfig {
                field: "peak_features.width_levels",
                ..
            })
        ));
    }

    #[test]
    fn test_frame_layout() {
        let layout = FrameLayout {
            start_mz: 50.0,
            frame_size: 50.0,
            number_of_frames: 3,
        };
        let frames: Vec<_> = layout.frames().collect();
        assert_eq!(frames, vec![(50.0, 100.0), (100.0, 150.0), (150.0, 200.0)]);
    }

    #[test]
    fn test_tolerance_serde() {
        let tol: MzTolerance = serde_json::from_str(r#"{"da": [0.01, 0.02]}"#).unwrap();
        assert_eq!(tol, MzTolerance::Absolute((0.01, 0.02)));
        assert!(tol.contains(100.0, 100.015));
        assert!(!tol.contains(100.0, 99.985));
    }
}
