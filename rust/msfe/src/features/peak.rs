//! Features of a single expected ion, derived from its fitted curve.

use crate::config::PeakFeatureConfig;
use crate::models::feature::finite;
use crate::models::{
    FeatureRecord,
    FeatureValue,
    FittedCurve,
    PeakFit,
    Spectrum,
};
use crate::utils::stats::{
    slice_between,
    trapz,
};

/// Width of the curve at each fraction of its height.
///
/// Only the right flank is searched; the half width found there is doubled.
pub fn peak_widths(curve: &FittedCurve, levels: &[f64]) -> Vec<f64> {
    let apex = curve.apex_index();
    let apex_mz = curve.mz[apex];
    let max = curve.intensity[apex];
    levels
        .iter()
        .map(|level| {
            let target = max * level;
            let mut best = apex;
            let mut best_residual = f64::INFINITY;
            for i in apex..curve.intensity.len() {
                let residual = (curve.intensity[i] - target).abs();
                if residual < best_residual {
                    best_residual = residual;
                    best = i;
                }
            }
            2.0 * (apex_mz - curve.mz[best]).abs()
        })
        .collect()
}

/// Intensity ratios of the centroids found right of the apex, inside the
/// fitted region. The peak's own centroid is skipped.
pub fn subsequent_peak_ratios(
    curve: &FittedCurve,
    spectrum: &Spectrum,
    centroids: &[usize],
    own_centroid: Option<usize>,
    max_peaks: usize,
) -> Vec<f64> {
    let apex_mz = curve.apex_mz();
    let right = curve.right_mz();
    let max = curve.max_intensity();
    let mz = spectrum.mz();
    let intensity = spectrum.intensity();

    let mut out = Vec::with_capacity(max_peaks);
    for idx in centroids.iter() {
        if out.len() == max_peaks || mz[*idx] >= right {
            break;
        }
        if mz[*idx] <= apex_mz || Some(*idx) == own_centroid {
            continue;
        }
        out.push(intensity[*idx] / max);
    }
    out
}

/// Raw minus fitted area on each side of the apex: `(left, right)`.
pub fn tail_aucs(curve: &FittedCurve, spectrum: &Spectrum) -> (f64, f64) {
    let apex_mz = curve.apex_mz();
    let left = curve.left_mz();
    let right = curve.right_mz();

    let side = |lo: f64, hi: f64| {
        let (rx, ry) = spectrum.slice_mz_range(lo, hi);
        let (fx, fy) = slice_between(&curve.mz, &curve.intensity, lo, hi);
        trapz(rx, ry) - trapz(fx, fy)
    };
    (side(left, apex_mz), side(apex_mz, right))
}

/// `(l + r) / (2 * max(l, r))`, missing when undefined.
///
/// Within (0, 1] only when both tail AUCs are positive. When the fit
/// overshoots the raw signal on both sides the tails are negative and the
/// value can exceed 1.
pub fn symmetry(left_tail_auc: f64, right_tail_auc: f64) -> Option<f64> {
    finite((left_tail_auc + right_tail_auc) / (2.0 * left_tail_auc.max(right_tail_auc)))
}

/// Record of an ion that was not found or could not be fitted. Keys and
/// vector lengths are the same as for a fitted ion.
pub fn null_peak_features(peak_id: &str, config: &PeakFeatureConfig) -> FeatureRecord {
    FeatureRecord::new()
        .with(format!("is_missing_{peak_id}"), FeatureValue::flag(true))
        .with(format!("is_apex_flat_{peak_id}"), FeatureValue::missing())
        .with(format!("is_saturated_{peak_id}"), FeatureValue::missing())
        .with(format!("intensity_{peak_id}"), FeatureValue::missing())
        .with(
            format!("absolute_mass_accuracy_{peak_id}"),
            FeatureValue::missing(),
        )
        .with(format!("ppm_{peak_id}"), FeatureValue::missing())
        .with(
            format!("widths_{peak_id}"),
            FeatureValue::missing_vector(config.width_levels.len()),
        )
        .with(
            format!("subsequent_peaks_number_{peak_id}"),
            FeatureValue::missing(),
        )
        .with(
            format!("subsequent_peaks_ratios_{peak_id}"),
            FeatureValue::missing_vector(config.max_subsequent_peaks),
        )
        .with(format!("left_tail_auc_{peak_id}"), FeatureValue::missing())
        .with(format!("right_tail_auc_{peak_id}"), FeatureValue::missing())
        .with(format!("symmetry_{peak_id}"), FeatureValue::missing())
        .with(
            format!("goodness-of-fit_{peak_id}"),
            FeatureValue::missing_vector(3),
        )
}

pub fn extract_peak_features(
    fit: &PeakFit,
    spectrum: &Spectrum,
    centroids: &[usize],
    own_centroid: Option<usize>,
    config: &PeakFeatureConfig,
) -> FeatureRecord {
    let peak_id = fit.peak_id();
    let Some(curve) = fit.curve.as_ref() else {
        return null_peak_features(peak_id, config);
    };

    let max = curve.max_intensity();
    let widths = peak_widths(curve, &config.width_levels);

    let mut ratios: Vec<Option<f64>> = subsequent_peak_ratios(
        curve,
        spectrum,
        centroids,
        own_centroid,
        config.max_subsequent_peaks,
    )
    .into_iter()
    .map(finite)
    .collect();
    let found = ratios.len();
    ratios.resize(config.max_subsequent_peaks, None);

    let (left_auc, right_auc) = tail_aucs(curve, spectrum);

    FeatureRecord::new()
        .with(format!("is_missing_{peak_id}"), FeatureValue::flag(false))
        .with(
            format!("is_apex_flat_{peak_id}"),
            FeatureValue::flag(curve.info.is_apex_flat),
        )
        .with(
            format!("is_saturated_{peak_id}"),
            FeatureValue::flag(max > config.saturation_intensity),
        )
        .with(format!("intensity_{peak_id}"), FeatureValue::scalar(max))
        .with(
            format!("absolute_mass_accuracy_{peak_id}"),
            FeatureValue::scalar(curve.info.fit_theory_absolute_ma),
        )
        .with(
            format!("ppm_{peak_id}"),
            FeatureValue::scalar(curve.info.fit_theory_ppm),
        )
        .with(format!("widths_{peak_id}"), FeatureValue::vector(widths))
        .with(
            format!("subsequent_peaks_number_{peak_id}"),
            FeatureValue::scalar(found as f64),
        )
        .with(
            format!("subsequent_peaks_ratios_{peak_id}"),
            FeatureValue::Vector(ratios),
        )
        .with(
            format!("left_tail_auc_{peak_id}"),
            FeatureValue::scalar(left_auc),
        )
        .with(
            format!("right_tail_auc_{peak_id}"),
            FeatureValue::scalar(right_auc),
        )
        .with(
            format!("symmetry_{peak_id}"),
            FeatureValue::Scalar(symmetry(left_auc, right_auc)),
        )
        .with(
            format!("goodness-of-fit_{peak_id}"),
            FeatureValue::vector(curve.info.goodness_of_fit.to_array()),
        )
}
