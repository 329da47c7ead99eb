use msfe::catalogue::{
    Catalogue,
    ExpectedIon,
};
use msfe::fitting::GaussianPeakShape;
use msfe::utils::stats::linspace;
use msfe::{
    ExtractionConfig,
    FeatureExtractor,
    ScanSelection,
    Spectrum,
};

/// Sum of Gaussians (amplitude, center) with sigma 0.01 sampled every 0.004.
fn synthetic_spectrum(start: f64, end: f64, peaks: &[(f64, f64)]) -> Spectrum {
    let n = ((end - start) / 0.004).round() as usize + 1;
    let mz = linspace(start, end, n);
    let mut intensity = vec![0.0; mz.len()];
    for (amplitude, center) in peaks {
        let model = GaussianPeakShape::new(*amplitude, *center, 0.01);
        for (y, x) in intensity.iter_mut().zip(mz.iter()) {
            *y += model.density(*x);
        }
    }
    Spectrum::try_new(mz, intensity).unwrap()
}

fn single_ion_extractor() -> FeatureExtractor {
    let catalogue = Catalogue::try_new(vec![ExpectedIon::new("A", 200.0)], vec![]).unwrap();
    FeatureExtractor::try_new(ExtractionConfig::default(), catalogue).unwrap()
}

fn normal_only(indices: Vec<usize>) -> ScanSelection {
    ScanSelection {
        normal: indices,
        chemical_noise: vec![],
        instrument_noise: vec![],
    }
}

#[test]
fn test_single_clean_gaussian_end_to_end() {
    let extractor = single_ion_extractor();
    let spectra = vec![synthetic_spectrum(199.0, 201.0, &[(1000.0, 200.0)])];
    let out = extractor.extract_run(&spectra, &normal_only(vec![0])).unwrap();
    let row = &out.row;

    assert_eq!(row.get("is_missing_A"), Some(Some(0.0)));
    assert_eq!(row.get("is_saturated_A"), Some(Some(0.0)));
    let intensity = row.get("intensity_A").unwrap().unwrap();
    assert!((intensity - 1000.0).abs() < 1.0, "intensity {}", intensity);
    let ppm = row.get("ppm_A").unwrap().unwrap();
    assert!(ppm.abs() < 0.5, "ppm {}", ppm);

    let w0 = row.get("widths_A_0").unwrap().unwrap();
    let w1 = row.get("widths_A_1").unwrap().unwrap();
    let w2 = row.get("widths_A_2").unwrap().unwrap();
    assert!(w0 > w1 && w1 > w2, "widths {} {} {}", w0, w1, w2);
    // Width at half height is the FWHM of a sigma 0.01 Gaussian.
    assert!((w1 - 0.023548).abs() < 1e-4, "fwhm {}", w1);

    assert_eq!(row.get("subsequent_peaks_number_A"), Some(Some(0.0)));
    assert_eq!(row.get("subsequent_peaks_ratios_A_0"), Some(None));
    assert_eq!(out.scans_processed.normal, vec![0]);
}

#[test]
fn test_feature_names_do_not_depend_on_peak_presence() {
    let extractor = single_ion_extractor();
    let spectra = vec![
        synthetic_spectrum(199.0, 201.0, &[(1000.0, 200.0)]),
        synthetic_spectrum(199.0, 201.0, &[]),
    ];
    let full = extractor.extract_run(&spectra, &normal_only(vec![0])).unwrap();
    let empty = extractor.extract_run(&spectra, &normal_only(vec![1])).unwrap();
    assert!(!full.row.is_empty());
    assert_eq!(full.row.names(), empty.row.names());
}

#[test]
fn test_absent_ion_reports_null_values() {
    let extractor = single_ion_extractor();
    let spectra = vec![synthetic_spectrum(249.0, 251.0, &[(1000.0, 250.0)])];
    let out = extractor.extract_run(&spectra, &normal_only(vec![0])).unwrap();
    let row = &out.row;

    assert_eq!(row.get("is_missing_A"), Some(Some(1.0)));
    for (name, value) in row.names().iter().zip(row.values()) {
        if name.ends_with("_A") || name.contains("_A_") {
            if name == "is_missing_A" {
                continue;
            }
            assert_eq!(*value, None, "{} should be missing", name);
        }
    }
    let written = row.values_with_sentinel(-1.0);
    let idx = row.names().iter().position(|n| n == "symmetry_A").unwrap();
    assert_eq!(written[idx], -1.0);
}

#[test]
fn test_aggregation_of_identical_scans_has_zero_spread() {
    let extractor = single_ion_extractor();
    let scan = synthetic_spectrum(199.0, 201.0, &[(1000.0, 200.0)]);
    let spectra = vec![scan.clone(), scan];

    let single = extractor.extract_run(&spectra, &normal_only(vec![0])).unwrap();
    let double = extractor.extract_run(&spectra, &normal_only(vec![0, 1])).unwrap();
    assert_eq!(double.row.len(), 2 * single.row.len());

    for (name, value) in single.row.names().iter().zip(single.row.values()) {
        let mean = double.row.get(&format!("{name}_mean")).unwrap();
        let std = double.row.get(&format!("{name}_std")).unwrap();
        match value {
            Some(v) => {
                assert_eq!(mean, Some(*v), "{}", name);
                assert_eq!(std, Some(0.0), "{}", name);
            }
            None => {
                assert_eq!(mean, None, "{}", name);
                assert_eq!(std, None, "{}", name);
            }
        }
    }
}

#[test]
fn test_missing_isotope_voids_the_distribution() {
    let catalogue = Catalogue::try_new(
        vec![
            ExpectedIon::new("A", 200.0)
                .with_isotopes(vec![200.0, 201.0, 202.0], vec![0.9, 0.09, 0.01]),
            ExpectedIon::new("A_i1", 201.0),
            ExpectedIon::new("A_i2", 202.0),
        ],
        vec![],
    )
    .unwrap();
    let extractor = FeatureExtractor::try_new(ExtractionConfig::default(), catalogue).unwrap();
    let spectra = vec![synthetic_spectrum(
        199.0,
        203.0,
        &[(1000.0, 200.0), (200.0, 201.0)],
    )];
    let out = extractor.extract_run(&spectra, &normal_only(vec![0])).unwrap();
    let row = &out.row;

    assert_eq!(row.get("is_missing_A_i1"), Some(Some(0.0)));
    assert_eq!(row.get("is_missing_A_i2"), Some(Some(1.0)));

    let ratio = row.get("isotopes_ratios_A_0").unwrap().unwrap();
    assert!((ratio - 0.2).abs() < 1e-3, "ratio {}", ratio);
    let diff = row.get("isotopes_mass_diffs_A_0").unwrap().unwrap();
    assert!((diff - 1.0).abs() < 1e-4, "mass diff {}", diff);
    assert_eq!(row.get("isotopes_ratios_A_1"), Some(None));
    assert_eq!(row.get("isotopes_mass_diffs_A_1"), Some(None));

    for i in 0..3 {
        assert_eq!(
            row.get(&format!("isotopes_ratios_diffs_A_{i}")),
            Some(None),
            "distribution entry {}",
            i
        );
    }
    assert_eq!(row.get("isotopes_ratios_diffs_A_3"), None);
}

#[test]
fn test_frames_of_a_scan_without_centroids() {
    let extractor = single_ion_extractor();
    let spectra = vec![synthetic_spectrum(100.0, 101.0, &[])];
    let selection = ScanSelection {
        normal: vec![],
        chemical_noise: vec![],
        instrument_noise: vec![0],
    };
    let out = extractor.extract_run(&spectra, &selection).unwrap();
    let row = &out.row;

    let layout = extractor.config().frames.instrument_noise;
    let frames: Vec<(f64, f64)> = layout.frames().collect();
    assert_eq!(frames.len(), layout.number_of_frames);
    for (left, right) in frames {
        let id = format!("bg_{left}_{right}");
        assert_eq!(row.get(&format!("number_of_peaks_{id}")), Some(Some(0.0)));
        assert_eq!(row.get(&format!("intensity_sum_{id}")), Some(Some(0.0)));
        for i in 0..3 {
            assert_eq!(row.get(&format!("percentiles_{id}_{i}")), Some(Some(0.0)));
            assert_eq!(row.get(&format!("top_percentiles_{id}_{i}")), Some(Some(0.0)));
        }
        for i in 0..10 {
            assert_eq!(
                row.get(&format!("top_peaks_intensities_{id}_{i}")),
                Some(Some(0.0))
            );
        }
    }
    // Instrument noise scans have no per-ion columns.
    assert_eq!(row.get("is_missing_A"), None);
}

#[test]
fn test_categories_are_concatenated_in_order() {
    let extractor = single_ion_extractor();
    let spectra = vec![
        synthetic_spectrum(199.0, 201.0, &[(1000.0, 200.0)]),
        synthetic_spectrum(179.0, 181.0, &[(50.0, 180.0)]),
    ];
    let selection = ScanSelection {
        normal: vec![0],
        chemical_noise: vec![1],
        instrument_noise: vec![1],
    };
    let out = extractor.extract_run(&spectra, &selection).unwrap();
    let names = out.row.names();
    let first_chem = names.iter().position(|n| n.contains("_chem_")).unwrap();
    let first_bg = names.iter().position(|n| n.contains("_bg_")).unwrap();
    let last_norm = names.iter().rposition(|n| n.contains("_norm_")).unwrap();
    assert!(last_norm < first_chem && first_chem < first_bg);
    assert_eq!(names[0], "is_missing_A");

    // Below the normal threshold, above the background one.
    assert_eq!(out.row.get("number_of_peaks_chem_150_200"), Some(Some(0.0)));
    assert_eq!(out.row.get("number_of_peaks_bg_150_200"), Some(Some(1.0)));
}

#[test]
fn test_catalogue_from_json_drives_extraction() {
    let json = r#"{
        "normal": [
            {"id": "A", "expected_mz": 200.0, "expected_fragments": [200.0, 150.0]},
            {"id": "A_f1", "expected_mz": 150.0}
        ]
    }"#;
    let catalogue = Catalogue::from_reader(json.as_bytes()).unwrap();
    let extractor = FeatureExtractor::try_new(ExtractionConfig::default(), catalogue).unwrap();
    let spectra = vec![synthetic_spectrum(
        149.0,
        201.0,
        &[(1000.0, 200.0), (400.0, 150.0)],
    )];
    let out = extractor.extract_run(&spectra, &normal_only(vec![0])).unwrap();
    let ratio = out.row.get("fragments_ratios_A_0").unwrap().unwrap();
    assert!((ratio - 0.4).abs() < 1e-3, "ratio {}", ratio);
    let diff = out.row.get("fragments_mass_diffs_A_0").unwrap().unwrap();
    assert!((diff - 50.0).abs() < 1e-4, "mass diff {}", diff);
}

#[test]
fn test_failed_fit_is_reported_missing_and_scan_continues() {
    let catalogue = Catalogue::try_new(
        vec![ExpectedIon::new("A", 200.0), ExpectedIon::new("B", 250.0)],
        vec![],
    )
    .unwrap();
    let extractor = FeatureExtractor::try_new(ExtractionConfig::default(), catalogue).unwrap();

    // A is found but its window only holds 3 raw points, too few for the fit.
    let short = Spectrum::try_new(vec![199.999, 200.0, 200.001], vec![0.0, 1000.0, 0.0]).unwrap();
    let full = synthetic_spectrum(199.0, 251.0, &[(1000.0, 200.0), (1000.0, 250.0)]);
    let spectra = vec![short, full];

    let failed = extractor.extract_run(&spectra, &normal_only(vec![0])).unwrap();
    assert_eq!(failed.row.get("is_missing_A"), Some(Some(1.0)));
    assert_eq!(failed.row.get("intensity_A"), Some(None));
    assert_eq!(failed.row.get("is_missing_B"), Some(Some(1.0)));

    let present = extractor.extract_run(&spectra, &normal_only(vec![1])).unwrap();
    assert_eq!(present.row.get("is_missing_A"), Some(Some(0.0)));
    assert_eq!(present.row.get("is_missing_B"), Some(Some(0.0)));
    assert_eq!(failed.row.len(), present.row.len());
    assert_eq!(failed.row.names(), present.row.names());
}
