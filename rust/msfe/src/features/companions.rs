//! Comparison of an ion with its isotopes and in-source fragments.
//!
//! Companion lists start with the parent itself; that entry takes part in
//! the isotopic distribution but is left out of ratios and mass differences.

use crate::catalogue::IonEntry;
use crate::models::feature::finite;
use crate::models::{
    FeatureRecord,
    FeatureValue,
    FittedCurve,
    PeakFit,
};
use std::collections::HashMap;

/// Fits of one scan, keyed by ion id.
pub type FitsById<'f, 'a> = HashMap<&'a str, &'f PeakFit<'a>>;

fn fitted<'f>(fits: &FitsById<'f, '_>, id: &str) -> Option<&'f FittedCurve> {
    fits.get(id).copied().and_then(|f| f.curve.as_ref())
}

pub fn null_isotope_features(entry: &IonEntry) -> FeatureRecord {
    let n = entry.isotopes.len();
    FeatureRecord::new()
        .with(
            format!("isotopes_ratios_{}", entry.id),
            FeatureValue::missing_vector(n.saturating_sub(1)),
        )
        .with(
            format!("isotopes_mass_diffs_{}", entry.id),
            FeatureValue::missing_vector(n.saturating_sub(1)),
        )
        .with(
            format!("isotopes_ratios_diffs_{}", entry.id),
            FeatureValue::missing_vector(n),
        )
}

pub fn null_fragment_features(entry: &IonEntry) -> FeatureRecord {
    let n = entry.fragments.len().saturating_sub(1);
    FeatureRecord::new()
        .with(
            format!("fragments_ratios_{}", entry.id),
            FeatureValue::missing_vector(n),
        )
        .with(
            format!("fragments_mass_diffs_{}", entry.id),
            FeatureValue::missing_vector(n),
        )
}

/// Isotope ratios, mass differences (isotope - parent) and the deviation of
/// the observed isotopic distribution from the expected one.
///
/// A single missing isotope voids the whole distribution comparison.
pub fn isotope_features(entry: &IonEntry, fits: &FitsById) -> FeatureRecord {
    let Some(parent) = fitted(fits, &entry.id) else {
        return null_isotope_features(entry);
    };
    let parent_max = parent.max_intensity();
    let parent_mz = parent.apex_mz();

    let mut ratios = Vec::with_capacity(entry.isotopes.len());
    let mut mass_diffs = Vec::with_capacity(entry.isotopes.len());
    let mut intensities = Vec::with_capacity(entry.isotopes.len());
    for isotope in entry.isotopes.iter() {
        match fitted(fits, &isotope.ion_id) {
            Some(curve) => {
                let max = curve.max_intensity();
                ratios.push(finite(max / parent_max));
                mass_diffs.push(finite(curve.apex_mz() - parent_mz));
                intensities.push(Some(max));
            }
            None => {
                ratios.push(None);
                mass_diffs.push(None);
                intensities.push(None);
            }
        }
    }

    let distribution_diffs: Vec<Option<f64>> =
        match intensities.iter().copied().collect::<Option<Vec<f64>>>() {
            Some(observed) => {
                let total: f64 = observed.iter().sum();
                observed
                    .iter()
                    .zip(entry.isotopes.iter())
                    .map(|(i, iso)| {
                        iso.expected_ratio
                            .and_then(|expected| finite(i / total - expected))
                    })
                    .collect()
            }
            None => vec![None; entry.isotopes.len()],
        };

    FeatureRecord::new()
        .with(
            format!("isotopes_ratios_{}", entry.id),
            FeatureValue::Vector(ratios.into_iter().skip(1).collect()),
        )
        .with(
            format!("isotopes_mass_diffs_{}", entry.id),
            FeatureValue::Vector(mass_diffs.into_iter().skip(1).collect()),
        )
        .with(
            format!("isotopes_ratios_diffs_{}", entry.id),
            FeatureValue::Vector(distribution_diffs),
        )
}

/// Fragment ratios and mass differences (parent - fragment).
pub fn fragment_features(entry: &IonEntry, fits: &FitsById) -> FeatureRecord {
    let Some(parent) = fitted(fits, &entry.id) else {
        return null_fragment_features(entry);
    };
    let parent_max = parent.max_intensity();
    let parent_mz = parent.apex_mz();

    let (ratios, mass_diffs): (Vec<Option<f64>>, Vec<Option<f64>>) = entry
        .fragments
        .iter()
        .skip(1)
        .map(|fragment| match fitted(fits, &fragment.ion_id) {
            Some(curve) => (
                finite(curve.max_intensity() / parent_max),
                finite(parent_mz - curve.apex_mz()),
            ),
            None => (None, None),
        })
        .unzip();

    FeatureRecord::new()
        .with(
            format!("fragments_ratios_{}", entry.id),
            FeatureValue::Vector(ratios),
        )
        .with(
            format!("fragments_mass_diffs_{}", entry.id),
            FeatureValue::Vector(mass_diffs),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::{
        ExpectedIon,
        IonSet,
    };
    use crate::fitting::GaussianPeakShape;
    use crate::models::{
        FitInfo,
        GoodnessOfFit,
        ScanCategory,
    };
    use crate::utils::stats::linspace;

    fn curve(amplitude: f64, mu: f64) -> FittedCurve {
        let model = GaussianPeakShape::new(amplitude, mu, 0.01);
        let mz = linspace(mu - 0.05, mu + 0.05, 1001);
        FittedCurve {
            intensity: model.predict(&mz),
            mz,
            info: FitInfo {
                model: "gaussian",
                goodness_of_fit: GoodnessOfFit {
                    reduced_chi_square: 0.0,
                    aic: 0.0,
                    bic: 0.0,
                },
                fit_theory_absolute_ma: 0.0,
                fit_theory_ppm: 0.0,
                signal_fit_absolute_ma: 0.0,
                signal_fit_ppm: 0.0,
                resolution: model.fwhm(),
                raw_intensity: Vec::new(),
                is_apex_flat: false,
            },
        }
    }

    fn ions() -> IonSet {
        IonSet::try_new(
            ScanCategory::Normal,
            vec![
                ExpectedIon::new("A", 200.0)
                    .with_isotopes(vec![200.0, 201.0], vec![0.8, 0.2])
                    .with_fragments(vec![200.0, 150.0]),
                ExpectedIon::new("A_i1", 201.0),
                ExpectedIon::new("A_f1", 150.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_complete_isotope_group() {
        let set = ions();
        let e = set.entries();
        let fits = [
            PeakFit {
                entry: &e[0],
                curve: Some(curve(800.0, 200.0)),
            },
            PeakFit {
                entry: &e[1],
                curve: Some(curve(200.0, 201.0)),
            },
            PeakFit::null(&e[2]),
        ];
        let by_id: FitsById = fits.iter().map(|f| (f.peak_id(), f)).collect();

        let iso = isotope_features(&e[0], &by_id);
        let ratios = iso.get("isotopes_ratios_A").unwrap().as_slice();
        assert_eq!(ratios.len(), 1);
        assert!((ratios[0].unwrap() - 0.25).abs() < 1e-9);
        let diffs = iso.get("isotopes_mass_diffs_A").unwrap().as_slice();
        assert!((diffs[0].unwrap() - 1.0).abs() < 1e-6);
        let dist = iso.get("isotopes_ratios_diffs_A").unwrap().as_slice();
        assert_eq!(dist.len(), 2);
        assert!(dist.iter().all(|x| x.unwrap().abs() < 1e-9));

        let frag = fragment_features(&e[0], &by_id);
        assert_eq!(
            frag.get("fragments_ratios_A").unwrap(),
            &FeatureValue::Vector(vec![None])
        );
    }

    #[test]
    fn test_missing_parent_gives_null_records() {
        let set = ions();
        let e = set.entries();
        let fits = [PeakFit::null(&e[0])];
        let by_id: FitsById = fits.iter().map(|f| (f.peak_id(), f)).collect();
        assert_eq!(isotope_features(&e[0], &by_id), null_isotope_features(&e[0]));
        assert_eq!(fragment_features(&e[0], &by_id), null_fragment_features(&e[0]));
    }
}
