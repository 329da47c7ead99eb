//! Flattening of per-scan feature records into aligned columns.
//!
//! The column layout is taken from the first scan of a category and every
//! following scan is checked against it, so a value can never land under
//! the wrong name.

use crate::errors::MsfeError;
use crate::features::ScanFeatures;
use crate::models::{
    FeatureShape,
    FeatureValue,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    features: Vec<(String, FeatureShape)>,
    names: Vec<String>,
}

impl ColumnLayout {
    /// Vector features expand to one column per element, `name_0`, `name_1`, ...
    pub fn from_scan(scan: &ScanFeatures) -> Self {
        let mut features = Vec::new();
        let mut names = Vec::new();
        for record in scan.records() {
            for (name, value) in record.iter() {
                match value {
                    FeatureValue::Scalar(_) => names.push(name.to_string()),
                    FeatureValue::Vector(v) => {
                        names.extend((0..v.len()).map(|i| format!("{name}_{i}")));
                    }
                }
                features.push((name.to_string(), value.shape()));
            }
        }
        Self { features, names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Values of `scan` in column order.
    pub fn flatten(&self, scan: &ScanFeatures) -> Result<Vec<Option<f64>>, MsfeError> {
        let mut out = Vec::with_capacity(self.names.len());
        let mut expected = self.features.iter();
        for (name, value) in scan.records().flat_map(|r| r.iter()) {
            let Some((expected_name, expected_shape)) = expected.next() else {
                return Err(MsfeError::UnsupportedFeatureType {
                    feature: name.to_string(),
                    expected: None,
                    found: Some(value.shape()),
                });
            };
            if expected_name != name || *expected_shape != value.shape() {
                return Err(MsfeError::UnsupportedFeatureType {
                    feature: name.to_string(),
                    expected: Some(*expected_shape),
                    found: Some(value.shape()),
                });
            }
            out.extend_from_slice(value.as_slice());
        }
        if let Some((name, shape)) = expected.next() {
            return Err(MsfeError::UnsupportedFeatureType {
                feature: name.clone(),
                expected: Some(*shape),
                found: None,
            });
        }
        Ok(out)
    }
}

/// One row of the feature matrix. Missing values stay `None` until the row
/// is written out with [`FeatureMatrixRow::values_with_sentinel`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureMatrixRow {
    names: Vec<String>,
    values: Vec<Option<f64>>,
}

impl FeatureMatrixRow {
    pub fn new(names: Vec<String>, values: Vec<Option<f64>>) -> Result<Self, MsfeError> {
        if names.len() != values.len() {
            return Err(MsfeError::DataProcessingError(
                crate::errors::DataProcessingError::ExpectedSlicesSameLength {
                    expected: names.len(),
                    other: values.len(),
                    context: "feature row names and values".into(),
                },
            ));
        }
        Ok(Self { names, values })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// `None` if there is no such column, `Some(None)` if it is missing.
    pub fn get(&self, name: &str) -> Option<Option<f64>> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    pub fn extend(&mut self, other: FeatureMatrixRow) {
        self.names.extend(other.names);
        self.values.extend(other.values);
    }

    pub fn values_with_sentinel(&self, missing_value: f64) -> Vec<f64> {
        self.values
            .iter()
            .map(|v| v.unwrap_or(missing_value))
            .collect()
    }
}
