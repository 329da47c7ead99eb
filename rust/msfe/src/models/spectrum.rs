use crate::errors::DataProcessingError;
use crate::utils::stats::slice_between;
use serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Clone, Deserialize)]
struct RawSpectrum {
    mz: Vec<f64>,
    intensity: Vec<f64>,
}

/// A single scan: index aligned m/z and intensity arrays.
///
/// The m/z array is guaranteed to be sorted in non-decreasing order and both
/// arrays only contain finite values. Once built it is never mutated, all the
/// extraction stages only borrow it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawSpectrum")]
pub struct Spectrum {
    mz: Vec<f64>,
    intensity: Vec<f64>,
}

impl TryFrom<RawSpectrum> for Spectrum {
    type Error = DataProcessingError;

    fn try_from(value: RawSpectrum) -> Result<Self, Self::Error> {
        Spectrum::try_new(value.mz, value.intensity)
    }
}

impl Spectrum {
    pub fn try_new(mz: Vec<f64>, intensity: Vec<f64>) -> Result<Self, DataProcessingError> {
        if mz.len() != intensity.len() {
            return Err(DataProcessingError::ExpectedSlicesSameLength {
                expected: mz.len(),
                other: intensity.len(),
                context: "Spectrum m/z and intensity arrays".to_string(),
            });
        }
        if mz.is_empty() {
            return Err(DataProcessingError::ExpectedNonEmptyData {
                context: Some("Spectrum".to_string()),
            });
        }
        if mz.iter().chain(intensity.iter()).any(|x| !x.is_finite()) {
            return Err(DataProcessingError::ExpectedFiniteNonNanData {
                context: "Spectrum arrays".to_string(),
            });
        }
        if mz.windows(2).any(|w| w[1] < w[0]) {
            return Err(DataProcessingError::ExpectedSortedData {
                context: "Spectrum m/z array".to_string(),
            });
        }
        Ok(Self { mz, intensity })
    }

    pub fn mz(&self) -> &[f64] {
        &self.mz
    }

    pub fn intensity(&self) -> &[f64] {
        &self.intensity
    }

    pub fn len(&self) -> usize {
        self.mz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mz.is_empty()
    }

    pub fn total_ion_current(&self) -> f64 {
        self.intensity.iter().sum()
    }

    /// Raw points with `left <= mz <= right`, as parallel slices.
    pub fn slice_mz_range(&self, left: f64, right: f64) -> (&[f64], &[f64]) {
        slice_between(&self.mz, &self.intensity, left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_mismatched_lengths() {
        let out = Spectrum::try_new(vec![1.0, 2.0], vec![1.0]);
        assert!(matches!(
            out,
            Err(DataProcessingError::ExpectedSlicesSameLength { .. })
        ));
    }

    #[test]
    fn test_rejects_empty_scan() {
        let out = Spectrum::try_new(vec![], vec![]);
        assert!(matches!(
            out,
            Err(DataProcessingError::ExpectedNonEmptyData { .. })
        ));
    }

    #[test]
    fn test_rejects_unsorted_mz() {
        let out = Spectrum::try_new(vec![2.0, 1.0], vec![1.0, 1.0]);
        assert!(matches!(
            out,
            Err(DataProcessingError::ExpectedSortedData { .. })
        ));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Spectrum = serde_json::from_str(r#"{"mz":[1.0,2.0],"intensity":[3.0,4.0]}"#).unwrap();
        assert_eq!(ok.len(), 2);
        assert_eq!(ok.total_ion_current(), 7.0);

        let bad: Result<Spectrum, _> = serde_json::from_str(r#"{"mz":[1.0],"intensity":[3.0,4.0]}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_slice_mz_range_is_inclusive() {
        let spec = Spectrum::try_new(vec![1.0, 2.0, 3.0, 4.0], vec![10., 20., 30., 40.]).unwrap();
        let (mz, int) = spec.slice_mz_range(2.0, 3.0);
        assert_eq!(mz, &[2.0, 3.0]);
        assert_eq!(int, &[20., 30.]);

        let (mz, _) = spec.slice_mz_range(5.0, 6.0);
        assert!(mz.is_empty());
    }
}
