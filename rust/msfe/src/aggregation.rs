//! Mean and spread of each column over the representative scans of a run.

use crate::errors::MsfeError;
use crate::merging::FeatureMatrixRow;
use crate::utils::stats::{
    mean,
    std_dev,
};

/// Aggregates aligned scan rows column by column.
///
/// Missing values are ignored. A column seen in two or more scans becomes
/// `(mean, population std)`, seen once `(value, 0)`, never seen
/// `(missing, missing)`. A single scan is returned as is.
pub fn aggregate_scans(
    names: &[String],
    scans: &[Vec<Option<f64>>],
) -> Result<FeatureMatrixRow, MsfeError> {
    match scans {
        [] => Ok(FeatureMatrixRow::default()),
        [single] => FeatureMatrixRow::new(names.to_vec(), single.clone()),
        _ => {
            let mut out_names = Vec::with_capacity(names.len() * 2);
            let mut out_values = Vec::with_capacity(names.len() * 2);
            let mut column = Vec::with_capacity(scans.len());
            for (j, name) in names.iter().enumerate() {
                column.clear();
                column.extend(scans.iter().filter_map(|s| s.get(j).copied().flatten()));
                let (m, s) = match column.len() {
                    0 => (None, None),
                    1 => (Some(column[0]), Some(0.0)),
                    _ => (mean(&column), std_dev(&column)),
                };
                out_names.push(format!("{name}_mean"));
                out_names.push(format!("{name}_std"));
                out_values.push(m);
                out_values.push(s);
            }
            FeatureMatrixRow::new(out_names, out_values)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["a".into(), "b".into(), "c".into()]
    }

    #[test]
    fn test_single_scan_is_unchanged() {
        let row = vec![Some(1.0), None, Some(3.0)];
        let out = aggregate_scans(&names(), &[row.clone()]).unwrap();
        assert_eq!(out.names(), names().as_slice());
        assert_eq!(out.values(), row.as_slice());
    }

    #[test]
    fn test_identical_scans_have_zero_spread() {
        let row = vec![Some(1.0), Some(2.0), Some(3.0)];
        let out = aggregate_scans(&names(), &[row.clone(), row]).unwrap();
        assert_eq!(out.len(), 6);
        assert_eq!(out.get("b_mean"), Some(Some(2.0)));
        assert_eq!(out.get("b_std"), Some(Some(0.0)));
    }

    #[test]
    fn test_missing_values_are_skipped() {
        let scans = vec![
            vec![Some(1.0), None, None],
            vec![Some(3.0), Some(5.0), None],
        ];
        let out = aggregate_scans(&names(), &scans).unwrap();
        assert_eq!(out.get("a_mean"), Some(Some(2.0)));
        assert_eq!(out.get("a_std"), Some(Some(1.0)));
        assert_eq!(out.get("b_mean"), Some(Some(5.0)));
        assert_eq!(out.get("b_std"), Some(Some(0.0)));
        assert_eq!(out.get("c_mean"), Some(None));
        assert_eq!(out.get("c_std"), Some(None));
    }
}
