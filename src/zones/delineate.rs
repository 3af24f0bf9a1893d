//! Automatic zone-count selection and clustering

use super::features::FeatureMatrix;
use super::kmeans::{kmeans, KMeansParams};
use super::silhouette::{sample_rows, silhouette_score};
use crate::config::ZoneConfig;
use crate::error::{Error, Result};
use crate::interpolate::InterpolationGrid;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a candidate zone count was or was not scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    /// Clustered, every zone large enough, silhouette computed
    Scored,
    /// Fewer than `k * min_cells_per_zone` defined cells
    TooFewCells,
    /// Fewer than `k` distinct cell values
    TooFewDistinctValues,
    /// No restart converged within the iteration budget
    NotConverged,
    /// A zone ended up below `min_cells_per_zone`
    UndersizedZone,
}

impl fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scored => write!(f, "scored"),
            Self::TooFewCells => write!(f, "too few cells"),
            Self::TooFewDistinctValues => write!(f, "too few distinct values"),
            Self::NotConverged => write!(f, "not converged"),
            Self::UndersizedZone => write!(f, "undersized zone"),
        }
    }
}

/// Evaluation of one candidate zone count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub k: usize,
    pub status: CandidateStatus,
    /// Mean silhouette; `None` unless scored with `k >= 2`
    pub silhouette: Option<f64>,
    pub inertia: Option<f64>,
}

/// Record of a fallback below the requested zone range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegenerateNote {
    /// Why the smallest requested zone count was rejected
    pub reason: CandidateStatus,
    pub defined_cells: usize,
    pub distinct_values: usize,
    pub min_zones: usize,
    pub min_cells_per_zone: usize,
    pub fallback_k: usize,
}

impl fmt::Display for DegenerateNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            CandidateStatus::TooFewDistinctValues => write!(
                f,
                "{} distinct cell values cannot form {} zones",
                self.distinct_values, self.min_zones
            ),
            CandidateStatus::UndersizedZone => write!(
                f,
                "clustering into {} zones leaves a zone below {} cells",
                self.min_zones, self.min_cells_per_zone
            ),
            CandidateStatus::TooFewCells => write!(
                f,
                "{} defined cells cannot form {} zones of at least {} cells",
                self.defined_cells, self.min_zones, self.min_cells_per_zone
            ),
            status => write!(f, "{} zones rejected ({})", self.min_zones, status),
        }
    }
}

impl DegenerateNote {
    fn to_error(&self) -> Error {
        Error::DegenerateInput {
            defined_cells: self.defined_cells,
            min_zones: self.min_zones,
            min_cells_per_zone: self.min_cells_per_zone,
        }
    }
}

/// Ranked clustering of a grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delineation {
    pub k: usize,
    /// Ranked zone label (0-based) per grid cell; `None` for undefined cells
    pub labels: Vec<Option<usize>>,
    /// Silhouette of the selected k; `None` when undefined
    pub quality: Option<f64>,
    /// Every candidate in the requested range, ascending k
    pub candidates: Vec<CandidateScore>,
    pub degenerate: Option<DegenerateNote>,
}

struct Evaluated {
    score: CandidateScore,
    labels: Option<Vec<usize>>,
}

/// Cluster the defined cells of `grid` and choose the zone count
pub fn delineate(grid: &InterpolationGrid, config: &ZoneConfig) -> Result<Delineation> {
    config.validate()?;

    let features = FeatureMatrix::from_grid(grid, config.spatial_weight);
    let n = features.len();
    if n == 0 {
        return Err(Error::DegenerateInput {
            defined_cells: 0,
            min_zones: config.min_zones,
            min_cells_per_zone: config.min_cells_per_zone,
        });
    }

    let distinct = features.distinct_values();
    let rows = sample_rows(n, config.silhouette_sample_size, config.seed);

    let evaluated: Vec<Evaluated> = (config.min_zones..=config.max_zones)
        .into_par_iter()
        .map(|k| evaluate(&features, k, distinct, &rows, config))
        .collect();

    for e in &evaluated {
        match e.score.status {
            CandidateStatus::Scored => tracing::debug!(
                k = e.score.k,
                silhouette = ?e.score.silhouette,
                inertia = ?e.score.inertia,
                "scored candidate"
            ),
            CandidateStatus::NotConverged => tracing::warn!(
                k = e.score.k,
                max_iter = config.max_iter,
                "candidate did not converge, excluded"
            ),
            status => tracing::debug!(k = e.score.k, %status, "candidate infeasible"),
        }
    }

    let candidates: Vec<CandidateScore> = evaluated.iter().map(|e| e.score.clone()).collect();

    if let Some(best) = select(&evaluated, config.tie_tolerance) {
        let raw = evaluated[best].labels.clone().unwrap_or_default();
        let k = evaluated[best].score.k;
        tracing::info!(
            k,
            silhouette = ?evaluated[best].score.silhouette,
            cells = n,
            "selected zone count"
        );
        return Ok(Delineation {
            k,
            labels: ranked_cell_labels(grid, &features, &raw, k),
            quality: evaluated[best].score.silhouette,
            candidates,
            degenerate: None,
        });
    }

    let not_converged: Vec<usize> = candidates
        .iter()
        .filter(|c| c.status == CandidateStatus::NotConverged)
        .map(|c| c.k)
        .collect();
    if !not_converged.is_empty() {
        return Err(Error::ClusteringFailed {
            candidates: not_converged,
            max_iter: config.max_iter,
        });
    }

    // Nothing in range is feasible: largest feasible k below the range,
    // ending at a single zone
    let (k, raw) = (1..config.min_zones)
        .rev()
        .filter(|&k| k > 1)
        .map(|k| evaluate(&features, k, distinct, &rows, config))
        .find(|e| e.score.status == CandidateStatus::Scored)
        .and_then(|e| e.labels.map(|labels| (e.score.k, labels)))
        .unwrap_or_else(|| (1, vec![0; n]));

    let note = DegenerateNote {
        reason: candidates
            .first()
            .map_or(CandidateStatus::TooFewCells, |c| c.status),
        defined_cells: n,
        distinct_values: distinct,
        min_zones: config.min_zones,
        min_cells_per_zone: config.min_cells_per_zone,
        fallback_k: k,
    };
    if config.strict {
        return Err(note.to_error());
    }
    tracing::warn!(
        reason = %note.reason,
        defined_cells = n,
        min_zones = config.min_zones,
        min_cells_per_zone = config.min_cells_per_zone,
        fallback_k = k,
        "no feasible zone count in range, falling back"
    );

    Ok(Delineation {
        k,
        labels: ranked_cell_labels(grid, &features, &raw, k),
        quality: None,
        candidates,
        degenerate: Some(note),
    })
}

/// Cluster for one k; a pure function of its inputs
fn evaluate(
    features: &FeatureMatrix,
    k: usize,
    distinct: usize,
    rows: &[usize],
    config: &ZoneConfig,
) -> Evaluated {
    let unscored = |status| Evaluated {
        score: CandidateScore {
            k,
            status,
            silhouette: None,
            inertia: None,
        },
        labels: None,
    };

    if features.len() < k.saturating_mul(config.min_cells_per_zone) {
        return unscored(CandidateStatus::TooFewCells);
    }
    if distinct < k {
        return unscored(CandidateStatus::TooFewDistinctValues);
    }

    let fit = kmeans(
        features,
        &KMeansParams {
            k,
            n_init: config.n_init,
            max_iter: config.max_iter,
            tolerance: config.tolerance,
            seed: config.seed,
        },
    );
    if !fit.converged {
        return unscored(CandidateStatus::NotConverged);
    }
    if fit
        .cluster_sizes(k)
        .iter()
        .any(|&size| size < config.min_cells_per_zone)
    {
        return unscored(CandidateStatus::UndersizedZone);
    }

    Evaluated {
        score: CandidateScore {
            k,
            status: CandidateStatus::Scored,
            silhouette: silhouette_score(features, &fit.labels, k, rows),
            inertia: Some(fit.inertia),
        },
        labels: Some(fit.labels),
    }
}

/// Index of the winning candidate
///
/// Visits candidates in ascending k; a later one wins only by beating the
/// best score by more than `tie_tolerance`. An undefined score (k = 1)
/// loses to any defined one.
fn select(evaluated: &[Evaluated], tie_tolerance: f64) -> Option<usize> {
    let mut best: Option<(usize, Option<f64>)> = None;
    for (i, e) in evaluated.iter().enumerate() {
        if e.score.status != CandidateStatus::Scored {
            continue;
        }
        let score = e.score.silhouette;
        let wins = match (best, score) {
            (None, _) => true,
            (Some((_, None)), Some(_)) => true,
            (Some((_, Some(b))), Some(s)) => s > b + tie_tolerance,
            _ => false,
        };
        if wins {
            best = Some((i, score));
        }
    }
    best.map(|(i, _)| i)
}

/// Relabel raw clusters by ascending mean value, ties by raw label
///
/// Returns the ranked label of each input row. Pure and stable: ranking an
/// already ranked labelling returns it unchanged.
pub fn rank_labels(raw: &[usize], values: &[f64], k: usize) -> Vec<usize> {
    let mut sums = vec![0.0; k];
    let mut counts = vec![0usize; k];
    for (&label, &v) in raw.iter().zip(values) {
        sums[label] += v;
        counts[label] += 1;
    }
    let means: Vec<f64> = (0..k)
        .map(|c| {
            if counts[c] > 0 {
                sums[c] / counts[c] as f64
            } else {
                f64::INFINITY
            }
        })
        .collect();

    let mut order: Vec<usize> = (0..k).collect();
    order.sort_by(|&a, &b| means[a].total_cmp(&means[b]).then(a.cmp(&b)));

    let mut rank = vec![0; k];
    for (r, &c) in order.iter().enumerate() {
        rank[c] = r;
    }
    raw.iter().map(|&label| rank[label]).collect()
}

fn ranked_cell_labels(
    grid: &InterpolationGrid,
    features: &FeatureMatrix,
    raw: &[usize],
    k: usize,
) -> Vec<Option<usize>> {
    let ranked = rank_labels(raw, features.values(), k);
    let mut labels = vec![None; grid.len()];
    for (&cell, &label) in features.cells().iter().zip(&ranked) {
        labels[cell] = Some(label);
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolate::GridSpec;
    use approx::assert_relative_eq;

    fn grid(values: Vec<Option<f64>>) -> InterpolationGrid {
        let spec = GridSpec {
            origin_x: 0.0,
            origin_y: 0.0,
            cell_size: 10.0,
            rows: 1,
            cols: values.len(),
        };
        InterpolationGrid::new(spec, values).unwrap()
    }

    fn defined(values: &[f64]) -> InterpolationGrid {
        grid(values.iter().map(|&v| Some(v)).collect())
    }

    #[test]
    fn test_three_groups_selected() {
        let mut values = Vec::new();
        for base in [10.0, 50.0, 90.0] {
            for i in 0..20 {
                values.push(base + (i % 5) as f64 * 0.1);
            }
        }
        let result = delineate(&defined(&values), &ZoneConfig::default()).unwrap();

        assert_eq!(result.k, 3);
        assert!(result.degenerate.is_none());
        assert!(result.quality.unwrap() > 0.9);
        assert_eq!(result.candidates.len(), 6);
        // Lowest values rank first
        assert_eq!(result.labels[0], Some(0));
        assert_eq!(result.labels[25], Some(1));
        assert_eq!(result.labels[59], Some(2));
    }

    #[test]
    fn test_only_two_feasible() {
        let values: Vec<f64> = (0..40).map(|i| if i % 2 == 0 { 20.0 } else { 80.0 }).collect();
        let result = delineate(&defined(&values), &ZoneConfig::default()).unwrap();

        assert_eq!(result.k, 2);
        assert!(result.degenerate.is_none());
        assert_relative_eq!(result.quality.unwrap(), 1.0, epsilon = 1e-12);
        assert!(result.candidates[1..]
            .iter()
            .all(|c| c.status == CandidateStatus::TooFewDistinctValues));
    }

    #[test]
    fn test_identical_values_fall_back_to_one_zone() {
        let result = delineate(&defined(&[60.0; 100]), &ZoneConfig::default()).unwrap();

        assert_eq!(result.k, 1);
        assert_eq!(result.quality, None);
        assert!(result.labels.iter().all(|&l| l == Some(0)));
        let note = result.degenerate.unwrap();
        assert_eq!(note.fallback_k, 1);
        assert_eq!(note.defined_cells, 100);
        assert_eq!(note.reason, CandidateStatus::TooFewDistinctValues);
        assert_eq!(note.distinct_values, 1);
        assert_eq!(note.to_string(), "1 distinct cell values cannot form 2 zones");
    }

    #[test]
    fn test_only_two_large_enough_zones() {
        let config = ZoneConfig {
            min_cells_per_zone: 2,
            ..ZoneConfig::default()
        };
        let result = delineate(&defined(&[1.0, 2.0, 3.0, 10.0, 11.0]), &config).unwrap();

        assert_eq!(result.k, 2);
        assert!(result.degenerate.is_none());
        assert!(result.quality.is_some());
        assert_eq!(
            result.labels,
            vec![Some(0), Some(0), Some(0), Some(1), Some(1)]
        );
        assert!(result.candidates[1..]
            .iter()
            .all(|c| c.status == CandidateStatus::TooFewCells));
    }

    #[test]
    fn test_three_cells_with_min_cells_two() {
        let config = ZoneConfig {
            min_cells_per_zone: 2,
            ..ZoneConfig::default()
        };
        let g = grid(vec![Some(1.0), None, Some(5.0), Some(9.0)]);
        let result = delineate(&g, &config).unwrap();

        assert_eq!(result.k, 1);
        assert_eq!(result.quality, None);
        assert_eq!(result.labels, vec![Some(0), None, Some(0), Some(0)]);
        assert!(result
            .candidates
            .iter()
            .all(|c| c.status == CandidateStatus::TooFewCells));
        let note = result.degenerate.unwrap();
        assert_eq!(note.defined_cells, 3);
        assert_eq!(note.reason, CandidateStatus::TooFewCells);
        assert_eq!(
            note.to_string(),
            "3 defined cells cannot form 2 zones of at least 2 cells"
        );

        let strict = ZoneConfig {
            strict: true,
            ..config
        };
        match delineate(&g, &strict) {
            Err(Error::DegenerateInput {
                defined_cells,
                min_zones,
                min_cells_per_zone,
            }) => assert_eq!((defined_cells, min_zones, min_cells_per_zone), (3, 2, 2)),
            other => panic!("expected DegenerateInput, got {:?}", other),
        }
    }

    #[test]
    fn test_fallback_prefers_largest_feasible_k_below_range() {
        let config = ZoneConfig {
            min_zones: 4,
            max_zones: 6,
            ..ZoneConfig::default()
        };
        let values: Vec<f64> = (0..30).map(|i| [10.0, 50.0, 90.0][i % 3]).collect();
        let result = delineate(&defined(&values), &config).unwrap();
        assert_eq!(result.k, 3);
        assert_eq!(result.quality, None);
        assert_eq!(result.degenerate.unwrap().fallback_k, 3);
    }

    #[test]
    fn test_no_defined_cells_is_terminal() {
        let result = delineate(&grid(vec![None, None]), &ZoneConfig::default());
        assert!(matches!(
            result,
            Err(Error::DegenerateInput { defined_cells: 0, .. })
        ));
    }

    #[test]
    fn test_non_convergence_is_clustering_failure() {
        let values: Vec<f64> = (0..300).map(|i| ((i * 37) % 101) as f64).collect();
        let config = ZoneConfig {
            min_zones: 3,
            max_zones: 4,
            n_init: 1,
            max_iter: 1,
            tolerance: 0.0,
            ..ZoneConfig::default()
        };
        match delineate(&defined(&values), &config) {
            Err(Error::ClusteringFailed { candidates, max_iter }) => {
                assert_eq!(candidates, vec![3, 4]);
                assert_eq!(max_iter, 1);
            }
            other => panic!("expected ClusteringFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_partition_covers_defined_cells() {
        let values: Vec<Option<f64>> = (0..50)
            .map(|i| if i % 7 == 3 { None } else { Some(((i * 13) % 29) as f64) })
            .collect();
        let g = grid(values);
        let result = delineate(&g, &ZoneConfig::default()).unwrap();

        for (cell, label) in result.labels.iter().enumerate() {
            assert_eq!(label.is_some(), g.value(cell).is_some());
            if let Some(l) = label {
                assert!(*l < result.k);
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let values: Vec<f64> = (0..120).map(|i| ((i * 17) % 53) as f64).collect();
        let g = defined(&values);
        let a = delineate(&g, &ZoneConfig::default()).unwrap();
        let b = delineate(&g, &ZoneConfig::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rank_labels() {
        let values = [5.0, 1.0, 9.0, 1.0, 5.0];
        let raw = [2, 0, 1, 0, 2];
        let ranked = rank_labels(&raw, &values, 3);
        assert_eq!(ranked, vec![1, 0, 2, 0, 1]);
        // Idempotent on an already ranked labelling
        assert_eq!(rank_labels(&ranked, &values, 3), ranked);
    }

    #[test]
    fn test_rank_ties_by_raw_label() {
        let values = [4.0, 4.0, 1.0];
        let ranked = rank_labels(&[1, 0, 2], &values, 3);
        assert_eq!(ranked, vec![2, 1, 0]);
        assert_eq!(rank_labels(&ranked, &values, 3), ranked);
    }

    #[test]
    fn test_tie_tolerance_keeps_smaller_k() {
        let scored = |k, s| Evaluated {
            score: CandidateScore {
                k,
                status: CandidateStatus::Scored,
                silhouette: Some(s),
                inertia: Some(0.0),
            },
            labels: None,
        };
        let evaluated = vec![scored(2, 0.70), scored(3, 0.705), scored(4, 0.69)];
        assert_eq!(select(&evaluated, 0.01), Some(0));
        assert_eq!(select(&evaluated, 0.001), Some(1));
    }
}
