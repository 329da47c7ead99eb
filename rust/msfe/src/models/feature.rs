//! Feature values produced by the extraction stages.
//!
//! Missing values are `None` all the way through the pipeline. The numeric
//! sentinel only shows up when a row is serialized
//! (see [`crate::merging::FeatureMatrixRow`]).

use serde::{
    Deserialize,
    Serialize,
};

/// Keeps only finite values, anything else (NaN, +-inf) is "missing".
pub fn finite(value: f64) -> Option<f64> {
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureShape {
    Scalar,
    Vector(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Scalar(Option<f64>),
    Vector(Vec<Option<f64>>),
}

impl FeatureValue {
    pub fn scalar(value: f64) -> Self {
        Self::Scalar(finite(value))
    }

    pub fn flag(value: bool) -> Self {
        Self::Scalar(Some(if value { 1.0 } else { 0.0 }))
    }

    pub fn missing() -> Self {
        Self::Scalar(None)
    }

    pub fn vector<I: IntoIterator<Item = f64>>(values: I) -> Self {
        Self::Vector(values.into_iter().map(finite).collect())
    }

    pub fn missing_vector(len: usize) -> Self {
        Self::Vector(vec![None; len])
    }

    pub fn shape(&self) -> FeatureShape {
        match self {
            Self::Scalar(_) => FeatureShape::Scalar,
            Self::Vector(x) => FeatureShape::Vector(x.len()),
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(x) => *x,
            Self::Vector(_) => None,
        }
    }

    pub fn as_slice(&self) -> &[Option<f64>] {
        match self {
            Self::Scalar(x) => std::slice::from_ref(x),
            Self::Vector(x) => x,
        }
    }
}

/// Ordered list of named features, the unit every extraction stage produces.
///
/// Order is significant: it is the order the columns end up in the row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRecord {
    entries: Vec<(String, FeatureValue)>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: FeatureValue) {
        self.entries.push((name.into(), value));
    }

    pub fn with(mut self, name: impl Into<String>, value: FeatureValue) -> Self {
        self.push(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_finite_values_become_missing() {
        assert_eq!(FeatureValue::scalar(f64::NAN), FeatureValue::Scalar(None));
        assert_eq!(
            FeatureValue::vector([1.0, f64::INFINITY]),
            FeatureValue::Vector(vec![Some(1.0), None])
        );
    }

    #[test]
    fn test_record_preserves_insertion_order() {
        let rec = FeatureRecord::new()
            .with("b", FeatureValue::scalar(1.0))
            .with("a", FeatureValue::missing_vector(2));
        let names: Vec<_> = rec.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(rec.get("a").unwrap().shape(), FeatureShape::Vector(2));
    }
}
