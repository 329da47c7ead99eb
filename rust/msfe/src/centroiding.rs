//! Threshold gated local-maximum detection.
//!
//! A centroid is the index of a local maximum of the intensity array. Flat
//! tops (runs of equal intensities with strictly lower neighbours on both
//! sides) produce a single centroid at the middle of the run. The first and
//! last points of the array are never centroids.

/// Indices of local maxima with `intensity >= min_height`, in increasing order.
///
/// ```
/// use msfe::centroiding::find_centroids;
///
/// let y = [0.0, 5.0, 1.0, 3.0, 3.0, 3.0, 0.0, 200.0];
/// assert_eq!(find_centroids(&y, 2.0), vec![1, 4]);
/// assert_eq!(find_centroids(&y, 4.0), vec![1]);
/// ```
pub fn find_centroids(intensity: &[f64], min_height: f64) -> Vec<usize> {
    let n = intensity.len();
    let mut out = Vec::new();
    if n < 3 {
        return out;
    }

    let mut i = 1;
    while i < n - 1 {
        if intensity[i] <= intensity[i - 1] {
            i += 1;
            continue;
        }
        // Rising edge, walk to the end of a possible plateau.
        let start = i;
        let mut end = i;
        while end + 1 < n && intensity[end + 1] == intensity[start] {
            end += 1;
        }
        if end + 1 < n && intensity[end + 1] < intensity[start] && intensity[start] >= min_height {
            out.push((start + end) / 2);
        }
        i = end + 1;
    }
    out
}

/// Bounds `(start, end)` (inclusive) of the run of points with the same
/// intensity as `index`.
pub fn plateau_bounds(intensity: &[f64], index: usize) -> (usize, usize) {
    let value = intensity[index];
    let mut start = index;
    while start > 0 && intensity[start - 1] == value {
        start -= 1;
    }
    let mut end = index;
    while end + 1 < intensity.len() && intensity[end + 1] == value {
        end += 1;
    }
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_peak() {
        let y = [0.0, 1.0, 10.0, 1.0, 0.0];
        assert_eq!(find_centroids(&y, 5.0), vec![2]);
        assert!(find_centroids(&y, 11.0).is_empty());
    }

    #[test]
    fn test_edges_are_not_centroids() {
        let y = [10.0, 1.0, 10.0];
        assert!(find_centroids(&y, 0.0).is_empty());
        assert!(find_centroids(&[1.0, 2.0], 0.0).is_empty());
    }

    #[test]
    fn test_flat_top_gives_midpoint() {
        let y = [0.0, 7.0, 7.0, 7.0, 7.0, 0.0];
        assert_eq!(find_centroids(&y, 1.0), vec![2]);
        assert_eq!(plateau_bounds(&y, 2), (1, 4));
    }

    #[test]
    fn test_shoulder_plateau_is_not_a_peak() {
        // Plateau followed by a rise is a shoulder, not a maximum.
        let y = [0.0, 5.0, 5.0, 8.0, 0.0];
        assert_eq!(find_centroids(&y, 1.0), vec![3]);
    }
}
