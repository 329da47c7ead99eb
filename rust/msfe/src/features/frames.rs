//! Noise statistics over fixed m/z frames.
//!
//! Frames are half open, `[left, right)`. The centroid list is walked once
//! for all frames.

use crate::config::{
    FrameLayout,
    FramesConfig,
};
use crate::models::{
    FeatureRecord,
    FeatureValue,
    ScanCategory,
    Spectrum,
};
use crate::utils::stats::percentile_sorted;

fn percentiles(sorted: &[f64], levels: &[f64], fallback: f64) -> Vec<f64> {
    levels
        .iter()
        .map(|q| percentile_sorted(sorted, *q).unwrap_or(fallback))
        .collect()
}

/// Features of one frame given the intensities of its centroids.
pub fn frame_record(
    prefix: &str,
    left: f64,
    right: f64,
    mut intensities: Vec<f64>,
    config: &FramesConfig,
) -> FeatureRecord {
    let id = format!("{prefix}_{left}_{right}");
    let no_signal = config.no_signal_intensity;

    intensities.sort_by(|a, b| a.total_cmp(b));
    let count = intensities.len();
    let sum: f64 = intensities.iter().sum();
    let frame_percentiles = percentiles(&intensities, &config.percentiles, no_signal);

    let mut top: Vec<f64> = intensities.iter().rev().take(config.top_peaks).copied().collect();
    top.resize(config.top_peaks, no_signal);
    let mut top_sorted = top.clone();
    top_sorted.sort_by(|a, b| a.total_cmp(b));
    let top_percentiles = percentiles(&top_sorted, &config.percentiles, no_signal);

    FeatureRecord::new()
        .with(
            format!("number_of_peaks_{id}"),
            FeatureValue::scalar(count as f64),
        )
        .with(format!("intensity_sum_{id}"), FeatureValue::scalar(sum))
        .with(
            format!("percentiles_{id}"),
            FeatureValue::vector(frame_percentiles),
        )
        .with(
            format!("top_peaks_intensities_{id}"),
            FeatureValue::vector(top),
        )
        .with(
            format!("top_percentiles_{id}"),
            FeatureValue::vector(top_percentiles),
        )
}

/// One record per frame of `layout`, built from the centroids that are not
/// in `excluded` (sorted spectrum indices of matched peaks).
pub fn frames_with_layout(
    spectrum: &Spectrum,
    centroids: &[usize],
    excluded: &[usize],
    prefix: &str,
    layout: &FrameLayout,
    config: &FramesConfig,
) -> Vec<FeatureRecord> {
    let mz = spectrum.mz();
    let intensity = spectrum.intensity();
    let mut cursor = 0;

    layout
        .frames()
        .map(|(left, right)| {
            while cursor < centroids.len() && mz[centroids[cursor]] < left {
                cursor += 1;
            }
            let mut collected = Vec::new();
            while cursor < centroids.len() && mz[centroids[cursor]] < right {
                let idx = centroids[cursor];
                if excluded.binary_search(&idx).is_err() {
                    collected.push(intensity[idx]);
                }
                cursor += 1;
            }
            frame_record(prefix, left, right, collected, config)
        })
        .collect()
}

/// Frame records of a scan. Matched peaks are only excluded for categories
/// that have expected ions.
pub fn frame_features(
    spectrum: &Spectrum,
    centroids: &[usize],
    excluded: &[usize],
    category: ScanCategory,
    config: &FramesConfig,
) -> Vec<FeatureRecord> {
    let excluded: &[usize] = if category.has_expected_ions() {
        excluded
    } else {
        &[]
    };
    frames_with_layout(
        spectrum,
        centroids,
        excluded,
        category.frame_prefix(),
        config.layout_for(category),
        config,
    )
}
