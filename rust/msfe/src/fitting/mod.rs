pub mod gaussian;

use crate::config::FittingConfig;
use crate::errors::FitError;
use crate::models::{
    ActualPeak,
    FitInfo,
    FittedCurve,
    GoodnessOfFit,
    Spectrum,
};
use crate::utils::stats::linspace;
pub use gaussian::{
    fit_gaussian,
    FitSettings,
    GaussianPeakShape,
};

pub const GAUSSIAN_MODEL: &str = "gaussian";

/// Raw points used for the fit: `window_points` on each side of the centroid,
/// clipped to the spectrum.
pub fn fitting_window(spectrum: &Spectrum, index: usize, window_points: usize) -> (&[f64], &[f64]) {
    let start = index.saturating_sub(window_points);
    let end = (index + window_points + 1).min(spectrum.len());
    (&spectrum.mz()[start..end], &spectrum.intensity()[start..end])
}

/// Reduced chi-square, AIC and BIC the way lmfit reports them.
pub fn goodness_of_fit(chi_square: f64, n_points: usize, n_params: usize) -> GoodnessOfFit {
    let n = n_points as f64;
    let k = n_params as f64;
    let dof = n_points.saturating_sub(n_params).max(1) as f64;
    let log_term = n * (chi_square.max(1e-250) / n).ln();
    GoodnessOfFit {
        reduced_chi_square: chi_square / dof,
        aic: log_term + 2.0 * k,
        bic: log_term + n.ln() * k,
    }
}

/// Fits a Gaussian around a present peak and resamples it densely.
///
/// The resampled curve covers `apex +- peak_region_factor * fwhm`, every
/// downstream width and area computation works on it rather than on the
/// raw points.
pub fn fit_peak(
    spectrum: &Spectrum,
    peak: &ActualPeak,
    config: &FittingConfig,
) -> Result<FittedCurve, FitError> {
    let index = peak.index.ok_or(FitError::DegenerateWindow)?;
    let (x, y) = fitting_window(spectrum, index, config.window_points);
    let settings = FitSettings {
        max_iterations: config.max_iterations,
        ftol: config.ftol,
        xtol: config.xtol,
    };
    let fit = fit_gaussian(x, y, &settings)?;

    let resolution = fit.model.fwhm();
    if !(resolution.is_finite() && resolution > 0.0) {
        return Err(FitError::NonFiniteParameters);
    }
    let half_span = config.peak_region_factor * resolution;
    let mz = linspace(
        fit.model.mu - half_span,
        fit.model.mu + half_span,
        config.curve_points,
    );
    let intensity = fit.model.predict(&mz);

    let mut raw_apex = 0;
    for (i, v) in y.iter().enumerate() {
        if *v > y[raw_apex] {
            raw_apex = i;
        }
    }

    let mut curve = FittedCurve {
        mz,
        intensity,
        info: FitInfo {
            model: GAUSSIAN_MODEL,
            goodness_of_fit: goodness_of_fit(fit.chi_square, x.len(), 3),
            fit_theory_absolute_ma: 0.0,
            fit_theory_ppm: 0.0,
            signal_fit_absolute_ma: 0.0,
            signal_fit_ppm: 0.0,
            resolution,
            raw_intensity: y.to_vec(),
            is_apex_flat: peak.is_apex_flat,
        },
    };

    let predicted_mz = curve.apex_mz();
    let expected_mz = peak.expected_mz();
    let signal_fit = x[raw_apex] - predicted_mz;
    let fit_theory = (predicted_mz - expected_mz).abs();
    curve.info.signal_fit_absolute_ma = signal_fit;
    curve.info.signal_fit_ppm = signal_fit / predicted_mz * 1e6;
    curve.info.fit_theory_absolute_ma = fit_theory;
    curve.info.fit_theory_ppm = fit_theory / expected_mz * 1e6;

    Ok(curve)
}
