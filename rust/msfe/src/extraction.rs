//! Run level orchestration.
//!
//! For every scan: centroiding, matching against the expected ions of the
//! scan's category, one Gaussian fit per present ion, per-peak features,
//! isotope and fragment comparisons and frame noise statistics. Scans of a
//! category are merged into aligned rows and aggregated, categories are then
//! concatenated in the order normal, chemical noise, instrument noise.
//!
//! The first scan of each category is processed on its own to fix the column
//! layout; the remaining scans fan out on the rayon pool (or run serially
//! with the `serial_extraction` feature) and are collected in scan order.

use crate::aggregation::aggregate_scans;
use crate::catalogue::Catalogue;
use crate::centroiding::find_centroids;
use crate::config::ExtractionConfig;
use crate::errors::MsfeError;
use crate::features::companions::{
    fragment_features,
    isotope_features,
    FitsById,
};
use crate::features::frames::frame_features;
use crate::features::peak::extract_peak_features;
use crate::features::ScanFeatures;
use crate::fitting::fit_peak;
use crate::matching::{
    match_expected_ions,
    matched_indices,
};
use crate::merging::{
    ColumnLayout,
    FeatureMatrixRow,
};
use crate::models::{
    PeakFit,
    ScanCategory,
    Spectrum,
};
use crate::selection::ScanSelection;
use crate::timings::ExtractionTimings;
#[cfg(not(feature = "serial_extraction"))]
use rayon::prelude::*;
use std::time::Instant;
use tracing::{
    debug,
    info,
    warn,
};

/// Feature row of a run and the scans it was computed from.
#[derive(Debug, Clone)]
pub struct RunFeatures {
    pub row: FeatureMatrixRow,
    pub scans_processed: ScanSelection,
    pub timings: ExtractionTimings,
}

#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    config: ExtractionConfig,
    catalogue: Catalogue,
}

impl FeatureExtractor {
    pub fn try_new(config: ExtractionConfig, catalogue: Catalogue) -> Result<Self, MsfeError> {
        config.validate()?;
        Ok(Self { config, catalogue })
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    /// All feature records of one scan.
    ///
    /// Peak level failures never escape: an ion whose fit fails is reported
    /// with the null record and the rest of the scan goes on.
    pub fn extract_scan(
        &self,
        spectrum: &Spectrum,
        category: ScanCategory,
        timings: &mut ExtractionTimings,
    ) -> ScanFeatures {
        let mut out = ScanFeatures::default();
        timings.scans += 1;

        let st = Instant::now();
        let threshold = self.config.centroiding.threshold_for(category);
        let centroids = find_centroids(spectrum.intensity(), threshold);
        timings.centroiding += st.elapsed();

        let mut excluded = Vec::new();
        if let Some(ions) = self.catalogue.ions_for(category) {
            let st = Instant::now();
            let peaks = match_expected_ions(
                spectrum,
                &centroids,
                ions,
                &self.config.matching.mz_tolerance,
            );
            excluded = matched_indices(&peaks);
            timings.matching += st.elapsed();

            let st = Instant::now();
            let fits: Vec<PeakFit> = peaks
                .iter()
                .map(|peak| {
                    if !peak.is_present() {
                        return PeakFit::null(peak.entry);
                    }
                    match fit_peak(spectrum, peak, &self.config.fitting) {
                        Ok(curve) => PeakFit {
                            entry: peak.entry,
                            curve: Some(curve),
                        },
                        Err(e) => {
                            warn!(
                                "Fit of {} at m/z {} failed, reporting it as missing: {}",
                                peak.id(),
                                peak.expected_mz(),
                                e
                            );
                            PeakFit::null(peak.entry)
                        }
                    }
                })
                .collect();
            timings.fitting += st.elapsed();
            debug!(
                "{} of {} expected ions fitted in {} scan",
                fits.iter().filter(|f| f.is_fitted()).count(),
                fits.len(),
                category.name()
            );

            let st = Instant::now();
            out.independent = peaks
                .iter()
                .zip(fits.iter())
                .map(|(peak, fit)| {
                    extract_peak_features(
                        fit,
                        spectrum,
                        &centroids,
                        peak.index,
                        &self.config.peak_features,
                    )
                })
                .collect();

            let by_id: FitsById = fits.iter().map(|f| (f.peak_id(), f)).collect();
            for entry in ions.entries() {
                if !entry.isotopes.is_empty() {
                    out.isotopic.push(isotope_features(entry, &by_id));
                }
                if !entry.fragments.is_empty() {
                    out.fragmentation.push(fragment_features(entry, &by_id));
                }
            }
            timings.peak_features += st.elapsed();
        }

        let st = Instant::now();
        out.frames = frame_features(
            spectrum,
            &centroids,
            &excluded,
            category,
            &self.config.frames,
        );
        timings.frames += st.elapsed();

        out
    }

    /// Aggregated row of one category over the scans at `indices`.
    ///
    /// No scans means no columns.
    pub fn extract_category(
        &self,
        spectra: &[Spectrum],
        indices: &[usize],
        category: ScanCategory,
    ) -> Result<(FeatureMatrixRow, ExtractionTimings), MsfeError> {
        if let Some(bad) = indices.iter().find(|i| **i >= spectra.len()) {
            return Err(MsfeError::ScanIndexOutOfBounds {
                index: *bad,
                len: spectra.len(),
            });
        }
        let Some((first, rest)) = indices.split_first() else {
            debug!("No {} scans selected", category.name());
            return Ok((FeatureMatrixRow::default(), ExtractionTimings::default()));
        };

        let mut timings = ExtractionTimings::default();
        let first_features = self.extract_scan(&spectra[*first], category, &mut timings);
        let layout = ColumnLayout::from_scan(&first_features);
        let first_values = layout.flatten(&first_features)?;

        let process = |idx: &usize| -> Result<(Vec<Option<f64>>, ExtractionTimings), MsfeError> {
            let mut local = ExtractionTimings::default();
            let features = self.extract_scan(&spectra[*idx], category, &mut local);
            Ok((layout.flatten(&features)?, local))
        };

        #[cfg(not(feature = "serial_extraction"))]
        let rest_values: Vec<(Vec<Option<f64>>, ExtractionTimings)> =
            rest.par_iter().map(process).collect::<Result<_, _>>()?;

        #[cfg(feature = "serial_extraction")]
        let rest_values: Vec<(Vec<Option<f64>>, ExtractionTimings)> =
            rest.iter().map(process).collect::<Result<_, _>>()?;

        let mut rows = Vec::with_capacity(indices.len());
        rows.push(first_values);
        for (values, local) in rest_values {
            rows.push(values);
            timings += local;
        }

        let row = aggregate_scans(layout.names(), &rows)?;
        debug!(
            "{} scans: {} columns per scan, {} after aggregation",
            category.name(),
            layout.len(),
            row.len()
        );
        Ok((row, timings))
    }

    /// Feature row of a run: every category aggregated on its own, then
    /// concatenated.
    pub fn extract_run(
        &self,
        spectra: &[Spectrum],
        selection: &ScanSelection,
    ) -> Result<RunFeatures, MsfeError> {
        let start = Instant::now();
        info!(
            "Extracting features from {} normal, {} chemical noise and {} instrument noise scans",
            selection.normal.len(),
            selection.chemical_noise.len(),
            selection.instrument_noise.len()
        );

        let mut row = FeatureMatrixRow::default();
        let mut timings = ExtractionTimings::default();
        for category in ScanCategory::ALL {
            let (cat_row, cat_timings) =
                self.extract_category(spectra, selection.indices_for(category), category)?;
            row.extend(cat_row);
            timings += cat_timings;
        }

        let elapsed = start.elapsed();
        info!(
            "Feature extraction took {:?} ({:?} in scan stages) for {} scans, {} features",
            elapsed,
            timings.total(),
            timings.scans,
            row.len()
        );
        debug!("{:?}", timings);

        Ok(RunFeatures {
            row,
            scans_processed: selection.clone(),
            timings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::ExpectedIon;
    use crate::fitting::GaussianPeakShape;
    use crate::utils::stats::linspace;

    fn spectrum_with_peak(amplitude: f64) -> Spectrum {
        let mz = linspace(224.0, 226.0, 501);
        let peak = GaussianPeakShape::new(amplitude, 225.0, 0.01);
        let intensity = peak.predict(&mz);
        Spectrum::try_new(mz, intensity).unwrap()
    }

    fn extractor() -> FeatureExtractor {
        let catalogue = Catalogue::try_new(vec![ExpectedIon::new("A", 225.0)], vec![]).unwrap();
        FeatureExtractor::try_new(ExtractionConfig::default(), catalogue).unwrap()
    }

    #[test]
    fn test_out_of_range_scan_is_fatal() {
        let ex = extractor();
        let spectra = vec![spectrum_with_peak(1000.0)];
        let out = ex.extract_category(&spectra, &[0, 3], ScanCategory::Normal);
        assert!(matches!(
            out,
            Err(MsfeError::ScanIndexOutOfBounds { index: 3, len: 1 })
        ));
    }

    #[test]
    fn test_empty_category_has_no_columns() {
        let ex = extractor();
        let spectra = vec![spectrum_with_peak(1000.0)];
        let (row, timings) = ex
            .extract_category(&spectra, &[], ScanCategory::ChemicalNoise)
            .unwrap();
        assert!(row.is_empty());
        assert_eq!(timings.scans, 0);
    }

    #[test]
    fn test_scan_record_groups() {
        let ex = extractor();
        let spectrum = spectrum_with_peak(1000.0);
        let mut timings = ExtractionTimings::default();
        let normal = ex.extract_scan(&spectrum, ScanCategory::Normal, &mut timings);
        assert_eq!(normal.independent.len(), 1);
        assert!(normal.isotopic.is_empty());
        assert_eq!(normal.frames.len(), 19);

        let bg = ex.extract_scan(&spectrum, ScanCategory::InstrumentNoise, &mut timings);
        assert!(bg.independent.is_empty());
        assert_eq!(bg.frames.len(), 19);
        // The expected peak is excluded from the normal frames but not from background.
        assert_eq!(
            normal.frames[3]
                .get("number_of_peaks_norm_200_250")
                .unwrap()
                .as_scalar(),
            Some(0.0)
        );
        assert_eq!(
            bg.frames[3]
                .get("number_of_peaks_bg_200_250")
                .unwrap()
                .as_scalar(),
            Some(1.0)
        );
        assert_eq!(timings.scans, 2);
    }
}
