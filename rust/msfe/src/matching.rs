//! Assignment of expected ions to detected centroids.
//!
//! Every expected ion looks for its nearest centroid by m/z. The ion is
//! present when that centroid falls inside the m/z tolerance. When several
//! ions land on the same centroid the closest one keeps it (ties go to the
//! one listed first in the catalogue), ions with exactly the same expected
//! m/z as the winner share it, and every other contender is reported absent.

use crate::catalogue::{
    IonEntry,
    IonSet,
};
use crate::centroiding::plateau_bounds;
use crate::config::MzTolerance;
use crate::models::{
    ActualPeak,
    Spectrum,
};
use std::collections::HashMap;
use tracing::{
    debug,
    warn,
};

/// Position (in `centroids`) of the centroid closest to `mz`.
///
/// Equidistant neighbours resolve to the lower m/z one.
fn nearest_centroid(centroid_mzs: &[f64], mz: f64) -> Option<usize> {
    if centroid_mzs.is_empty() {
        return None;
    }
    let pos = centroid_mzs.partition_point(|x| *x < mz);
    if pos == 0 {
        return Some(0);
    }
    if pos == centroid_mzs.len() {
        return Some(pos - 1);
    }
    let left = mz - centroid_mzs[pos - 1];
    let right = centroid_mzs[pos] - mz;
    if right < left {
        Some(pos)
    } else {
        Some(pos - 1)
    }
}

struct Claim {
    entry_idx: usize,
    distance: f64,
}

/// Matches every entry of `ions` against the centroids of `spectrum`.
///
/// The output has one [`ActualPeak`] per entry, in catalogue order.
pub fn match_expected_ions<'a>(
    spectrum: &Spectrum,
    centroids: &[usize],
    ions: &'a IonSet,
    tolerance: &MzTolerance,
) -> Vec<ActualPeak<'a>> {
    let mz = spectrum.mz();
    let intensity = spectrum.intensity();
    let centroid_mzs: Vec<f64> = centroids.iter().map(|i| mz[*i]).collect();
    let entries: &'a [IonEntry] = ions.entries();

    let mut claims: HashMap<usize, Vec<Claim>> = HashMap::new();
    for (entry_idx, entry) in entries.iter().enumerate() {
        let Some(pos) = nearest_centroid(&centroid_mzs, entry.expected_mz) else {
            continue;
        };
        if !tolerance.contains(entry.expected_mz, centroid_mzs[pos]) {
            continue;
        }
        claims.entry(pos).or_default().push(Claim {
            entry_idx,
            distance: (centroid_mzs[pos] - entry.expected_mz).abs(),
        });
    }

    let mut assigned: Vec<Option<usize>> = vec![None; entries.len()];
    for (pos, contenders) in claims.iter() {
        let winner = contenders
            .iter()
            .min_by(|a, b| {
                a.distance
                    .total_cmp(&b.distance)
                    .then(a.entry_idx.cmp(&b.entry_idx))
            })
            .map(|x| x.entry_idx);
        let Some(winner) = winner else {
            continue;
        };
        let winner_mz = entries[winner].expected_mz;
        for claim in contenders.iter() {
            let entry = &entries[claim.entry_idx];
            if entry.expected_mz == winner_mz {
                assigned[claim.entry_idx] = Some(centroids[*pos]);
            } else {
                warn!(
                    "Ion {} lost centroid at m/z {:.5} to {}, reporting it as absent",
                    entry.id, centroid_mzs[*pos], entries[winner].id
                );
            }
        }
    }

    entries
        .iter()
        .zip(assigned)
        .map(|(entry, index)| match index {
            None => {
                debug!("No centroid found for {} ({})", entry.id, entry.expected_mz);
                ActualPeak::absent(entry)
            }
            Some(index) => {
                let (start, end) = plateau_bounds(intensity, index);
                ActualPeak {
                    entry,
                    index: Some((start + end) / 2),
                    is_apex_flat: end > start,
                }
            }
        })
        .collect()
}

/// Spectrum indices of all present peaks, sorted and deduplicated.
pub fn matched_indices(peaks: &[ActualPeak]) -> Vec<usize> {
    let mut out: Vec<usize> = peaks.iter().filter_map(|x| x.index).collect();
    out.sort_unstable();
    out.dedup();
    out
}
