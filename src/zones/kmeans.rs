//! Seeded k-means (k-means++ initialization, Lloyd iterations)

use super::features::{squared_distance, FeatureMatrix};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Parameters for one k-means fit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeansParams {
    pub k: usize,
    pub n_init: usize,
    pub max_iter: usize,
    pub tolerance: f64,
    pub seed: u64,
}

/// Outcome of the best restart
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    /// Raw cluster label per feature row (0..k)
    pub labels: Vec<usize>,
    pub centroids: Vec<Vec<f64>>,
    pub inertia: f64,
    pub iterations: usize,
    pub converged: bool,
}

impl KMeansFit {
    /// Members per cluster
    pub fn cluster_sizes(&self, k: usize) -> Vec<usize> {
        let mut sizes = vec![0; k];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }
}

/// Per-candidate RNG: the same `(seed, k)` always draws the same sequence
pub fn candidate_rng(seed: u64, k: usize) -> StdRng {
    StdRng::seed_from_u64(seed ^ (k as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Fit k-means with `n_init` restarts, keeping the lowest inertia
///
/// Converged restarts are preferred over non-converged ones; among equals
/// the earlier restart wins.
pub fn kmeans(features: &FeatureMatrix, params: &KMeansParams) -> KMeansFit {
    let mut rng = candidate_rng(params.seed, params.k);
    let mut best: Option<KMeansFit> = None;

    for _ in 0..params.n_init.max(1) {
        let init = plus_plus_init(features, params.k, &mut rng);
        let fit = lloyd(features, init, params.max_iter, params.tolerance);

        let better = match &best {
            None => true,
            Some(b) => match (fit.converged, b.converged) {
                (true, false) => true,
                (false, true) => false,
                _ => fit.inertia < b.inertia,
            },
        };
        if better {
            best = Some(fit);
        }
    }

    best.unwrap_or_else(|| lloyd(features, Vec::new(), 0, params.tolerance))
}

/// k-means++ seeding: each next centroid drawn with probability ~ D^2
fn plus_plus_init(features: &FeatureMatrix, k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let n = features.len();
    let mut centroids: Vec<Vec<f64>> = Vec::with_capacity(k);
    if n == 0 || k == 0 {
        return centroids;
    }

    centroids.push(features.row(rng.gen_range(0..n)).to_vec());
    let mut d2: Vec<f64> = (0..n)
        .map(|i| squared_distance(features.row(i), &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = d2.iter().sum();
        let pick = if total > 0.0 {
            let target = rng.gen::<f64>() * total;
            let mut acc = 0.0;
            let mut chosen = n - 1;
            for (i, &d) in d2.iter().enumerate() {
                acc += d;
                if acc > target {
                    chosen = i;
                    break;
                }
            }
            chosen
        } else {
            rng.gen_range(0..n)
        };

        let centroid = features.row(pick).to_vec();
        for (i, d) in d2.iter_mut().enumerate() {
            *d = d.min(squared_distance(features.row(i), &centroid));
        }
        centroids.push(centroid);
    }
    centroids
}

/// Nearest centroid, lowest index on ties
fn assign(row: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (c, centroid) in centroids.iter().enumerate() {
        let d = squared_distance(row, centroid);
        if d < best.1 {
            best = (c, d);
        }
    }
    best
}

fn lloyd(
    features: &FeatureMatrix,
    mut centroids: Vec<Vec<f64>>,
    max_iter: usize,
    tolerance: f64,
) -> KMeansFit {
    let n = features.len();
    let dims = features.dims();
    let k = centroids.len();
    let mut labels = vec![0; n];
    let mut converged = false;
    let mut iterations = 0;

    while iterations < max_iter && k > 0 {
        iterations += 1;

        for (i, label) in labels.iter_mut().enumerate() {
            *label = assign(features.row(i), &centroids).0;
        }

        let mut sums = vec![vec![0.0; dims]; k];
        let mut counts = vec![0usize; k];
        for (i, &label) in labels.iter().enumerate() {
            counts[label] += 1;
            for (s, v) in sums[label].iter_mut().zip(features.row(i)) {
                *s += v;
            }
        }

        let mut shift: f64 = 0.0;
        for c in 0..k {
            // Empty clusters keep their previous centroid
            if counts[c] == 0 {
                continue;
            }
            let updated: Vec<f64> = sums[c].iter().map(|s| s / counts[c] as f64).collect();
            shift = shift.max(squared_distance(&updated, &centroids[c]).sqrt());
            centroids[c] = updated;
        }

        if shift <= tolerance {
            converged = true;
            break;
        }
    }

    let mut inertia = 0.0;
    for (i, label) in labels.iter_mut().enumerate() {
        let (c, d) = assign(features.row(i), &centroids);
        *label = c;
        inertia += d;
    }

    KMeansFit {
        labels,
        centroids,
        inertia,
        iterations,
        converged,
    }
}
