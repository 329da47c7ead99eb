use crate::errors::CliError;
use indicatif::{
    ProgressIterator,
    ProgressStyle,
};
use msfe::{
    FeatureExtractor,
    RunFeatures,
    ScanSelection,
    SelectionConfig,
    Spectrum,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::fs::File;
use std::io::{
    BufRead,
    BufReader,
    BufWriter,
};
use std::path::{
    Path,
    PathBuf,
};
use std::time::Instant;
use tracing::{
    debug,
    error,
    info,
};

const DATE_FORMAT: &str = "%Y-%m-%dT%H%M%S";

/// One processed run as stored in the feature matrix file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunEntry {
    pub processing_date: String,
    pub original_filename: String,
    pub scans_processed: ScanSelection,
    pub features_values: Vec<f64>,
    pub features_names: Vec<String>,
}

impl RunEntry {
    pub fn new(path: &Path, features: &RunFeatures, missing_value: f64) -> Self {
        let original_filename = path
            .file_name()
            .map(|x| x.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Self {
            processing_date: chrono::Local::now().format(DATE_FORMAT).to_string(),
            original_filename,
            scans_processed: features.scans_processed.clone(),
            features_values: features.row.values_with_sentinel(missing_value),
            features_names: features.row.names().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FeatureMatrix {
    pub ms_runs: Vec<RunEntry>,
}

impl FeatureMatrix {
    /// Reads an existing matrix, or starts an empty one if the file is not there yet.
    pub fn load_or_default(path: &Path) -> Result<Self, CliError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let file = File::open(path).map_err(|e| CliError::io(e, path))?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| CliError::ParseError {
            msg: format!("{}: {}", path.display(), e),
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), CliError> {
        let file = File::create(path).map_err(|e| CliError::io(e, path))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self).map_err(|e| CliError::Io {
            source: e.to_string(),
            path: Some(path.to_string_lossy().to_string()),
        })
    }
}

/// Reads a run stored as NDJSON, one `{"mz": [...], "intensity": [...]}` scan per line.
///
/// Blank lines are skipped. A malformed scan fails the whole run.
pub fn read_run<R: BufRead>(reader: R) -> Result<Vec<Spectrum>, CliError> {
    let mut out = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| CliError::Io {
            source: e.to_string(),
            path: None,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let scan: Spectrum = serde_json::from_str(&line).map_err(|e| CliError::ParseError {
            msg: format!("scan on line {}: {}", lineno + 1, e),
        })?;
        out.push(scan);
    }
    Ok(out)
}

pub fn read_run_file(path: &Path) -> Result<Vec<Spectrum>, CliError> {
    let file = File::open(path).map_err(|e| CliError::io(e, path))?;
    read_run(BufReader::new(file)).map_err(|e| match e {
        CliError::ParseError { msg } => CliError::ParseError {
            msg: format!("{}: {}", path.display(), msg),
        },
        CliError::Io { source, .. } => CliError::Io {
            source,
            path: Some(path.to_string_lossy().to_string()),
        },
        other => other,
    })
}

pub fn process_run(
    path: &Path,
    extractor: &FeatureExtractor,
    selection: &SelectionConfig,
) -> Result<RunEntry, CliError> {
    let st = Instant::now();
    let spectra = read_run_file(path)?;
    info!(
        "Loading {} scans took {:?} for {}",
        spectra.len(),
        st.elapsed(),
        path.display()
    );

    let scans = selection.select(&spectra);
    debug!("Selected scans: {:?}", scans);
    let features = extractor.extract_run(&spectra, &scans)?;
    debug!(
        "Stage timings for {}: {}",
        path.display(),
        serde_json::to_string(&features.timings).unwrap_or_default()
    );
    Ok(RunEntry::new(
        path,
        &features,
        extractor.config().missing_value,
    ))
}

/// Extracts every run and appends the results to the feature matrix.
///
/// A run that fails is logged and left out; the others still get written.
pub fn main_loop(
    runs: &[PathBuf],
    extractor: &FeatureExtractor,
    selection: &SelectionConfig,
    feature_matrix: &Path,
) -> Result<(), CliError> {
    let start = Instant::now();
    let mut matrix = FeatureMatrix::load_or_default(feature_matrix)?;
    info!(
        "Appending to feature matrix {} with {} runs",
        feature_matrix.display(),
        matrix.ms_runs.len()
    );

    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
    )
    .map_err(|e| CliError::Config {
        source: e.to_string(),
    })?;

    let mut nfailed = 0;
    for path in runs.iter().progress_with_style(style) {
        match process_run(path, extractor, selection) {
            Ok(entry) => matrix.ms_runs.push(entry),
            Err(e) => {
                error!("Skipping run {}: {}", path.display(), e);
                nfailed += 1;
            }
        }
    }

    matrix.save(feature_matrix)?;
    println!(
        "Processed {} runs ({} failed) in {:?}",
        runs.len(),
        nfailed,
        start.elapsed()
    );
    if nfailed == runs.len() {
        return Err(CliError::Extraction {
            source: "every run failed".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use msfe::{
        Catalogue,
        ExpectedIon,
        ExtractionConfig,
    };

    #[test]
    fn test_read_run_skips_blank_lines() {
        let text = "{\"mz\": [100.0, 100.1], \"intensity\": [1.0, 2.0]}\n\n{\"mz\": [200.0], \"intensity\": [3.0]}\n";
        let scans = read_run(text.as_bytes()).unwrap();
        assert_eq!(scans.len(), 2);
        assert_eq!(scans[1].mz(), &[200.0]);
    }

    #[test]
    fn test_read_run_reports_the_bad_line() {
        let text = "{\"mz\": [100.0], \"intensity\": [1.0]}\n{\"mz\": [100.0, 99.0], \"intensity\": [1.0, 1.0]}\n";
        match read_run(text.as_bytes()) {
            Err(CliError::ParseError { msg }) => assert!(msg.contains("line 2"), "{}", msg),
            other => panic!("Expected a parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_run_entry_uses_sentinel_for_missing_values() {
        let catalogue = Catalogue::try_new(vec![ExpectedIon::new("A", 300.0)], vec![]).unwrap();
        let extractor =
            FeatureExtractor::try_new(ExtractionConfig::default(), catalogue).unwrap();
        let spectra = vec![Spectrum::try_new(vec![100.0, 100.1], vec![0.0, 0.0]).unwrap()];
        let selection = ScanSelection {
            normal: vec![0],
            ..Default::default()
        };
        let features = extractor.extract_run(&spectra, &selection).unwrap();
        let entry = RunEntry::new(Path::new("/data/run_01.ndjson"), &features, -1.0);

        assert_eq!(entry.original_filename, "run_01.ndjson");
        assert_eq!(entry.features_names.len(), entry.features_values.len());
        let idx = entry
            .features_names
            .iter()
            .position(|n| n == "intensity_A")
            .unwrap();
        assert_eq!(entry.features_values[idx], -1.0);
        assert!(chrono::NaiveDateTime::parse_from_str(&entry.processing_date, DATE_FORMAT).is_ok());

        let json = serde_json::to_value(FeatureMatrix {
            ms_runs: vec![entry],
        })
        .unwrap();
        assert_eq!(json["ms_runs"][0]["scans_processed"]["normal"][0], 0);
    }
}
