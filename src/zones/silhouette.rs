//! Silhouette quality score

use super::features::{squared_distance, FeatureMatrix};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Rows scored by the silhouette metric
///
/// Every row when there are at most `sample_size`; otherwise a seeded
/// subsample, sorted, identical for every candidate k of one run.
pub fn sample_rows(n: usize, sample_size: usize, seed: u64) -> Vec<usize> {
    if n <= sample_size {
        return (0..n).collect();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = rand::seq::index::sample(&mut rng, n, sample_size).into_vec();
    rows.sort_unstable();
    rows
}

/// Mean silhouette over `rows`
///
/// `a` is the mean distance to the other sampled members of the row's
/// cluster and `b` the smallest mean distance to another sampled cluster.
/// Members of singleton clusters score 0. Returns `None` for fewer than two
/// clusters, where the score is undefined.
pub fn silhouette_score(
    features: &FeatureMatrix,
    labels: &[usize],
    k: usize,
    rows: &[usize],
) -> Option<f64> {
    if k < 2 || rows.is_empty() {
        return None;
    }

    let total: f64 = rows
        .iter()
        .map(|&i| {
            let mut sums = vec![0.0; k];
            let mut counts = vec![0usize; k];
            for &j in rows {
                if i == j {
                    continue;
                }
                sums[labels[j]] += squared_distance(features.row(i), features.row(j)).sqrt();
                counts[labels[j]] += 1;
            }

            let own = labels[i];
            if counts[own] == 0 {
                return 0.0;
            }
            let a = sums[own] / counts[own] as f64;
            let b = (0..k)
                .filter(|&c| c != own && counts[c] > 0)
                .map(|c| sums[c] / counts[c] as f64)
                .fold(f64::INFINITY, f64::min);
            if !b.is_finite() {
                return 0.0;
            }

            let denom = a.max(b);
            if denom > 0.0 {
                (b - a) / denom
            } else {
                0.0
            }
        })
        .sum();

    Some(total / rows.len() as f64)
}
