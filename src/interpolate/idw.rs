//! Inverse distance weighting

use super::grid::{GridSpec, InterpolationGrid};
use crate::config::{GridConfig, IdwConfig};
use crate::crs::PlanarPoint;
use crate::error::{Error, Result, Stage};
use crate::spatial::{KdTree, Neighbor};
use rayon::prelude::*;

/// IDW estimator fitted to one planar point set
///
/// Holds the k-d tree and the point values; the tree is read-only after
/// `fit`, so estimates can run concurrently.
#[derive(Debug, Clone)]
pub struct IdwInterpolator {
    tree: KdTree,
    values: Vec<f64>,
    params: IdwConfig,
}

impl IdwInterpolator {
    /// Validate parameters and points, then index the points
    pub fn fit(points: &[PlanarPoint], params: &IdwConfig) -> Result<Self> {
        params.validate()?;

        if points.is_empty() {
            return Err(Error::EmptyInput {
                stage: Stage::Interpolate,
            });
        }
        if points.len() < params.min_points {
            return Err(Error::InsufficientData {
                stage: Stage::Interpolate,
                found: points.len(),
                required: params.min_points,
            });
        }
        for (index, p) in points.iter().enumerate() {
            if !(p.x.is_finite() && p.y.is_finite()) {
                return Err(Error::InvalidGeometry {
                    index,
                    reason: format!("non-finite planar coordinate ({}, {})", p.x, p.y),
                });
            }
            if !p.value.is_finite() {
                return Err(Error::InvalidGeometry {
                    index,
                    reason: format!("non-finite value {}", p.value),
                });
            }
        }

        let tree = KdTree::new(points.iter().map(|p| [p.x, p.y]).collect());
        let values = points.iter().map(|p| p.value).collect();

        Ok(Self {
            tree,
            values,
            params: params.clone(),
        })
    }

    /// Neighbors used for an estimate at `(x, y)`
    pub fn neighbors(&self, x: f64, y: f64) -> Vec<Neighbor> {
        self.tree
            .nearest(x, y, self.params.max_neighbors, self.params.search_radius)
    }

    /// Estimate at `(x, y)`, or `None` when too few neighbors are in range
    ///
    /// Coincident points (distance 0) take precedence: the estimate is the
    /// mean of their values.
    pub fn estimate(&self, x: f64, y: f64) -> Option<f64> {
        let neighbors = self.neighbors(x, y);
        if neighbors.is_empty() || neighbors.len() < self.params.min_neighbors {
            return None;
        }

        // Sorted by distance, so coincident points lead
        let coincident = neighbors.iter().take_while(|n| n.distance == 0.0).count();
        if coincident > 0 {
            let sum: f64 = neighbors[..coincident]
                .iter()
                .map(|n| self.values[n.index])
                .sum();
            return Some(sum / coincident as f64);
        }

        // Weights relative to the closest neighbor stay in (0, 1] and cannot
        // overflow for tiny distances
        let nearest = neighbors[0].distance;
        let (weighted, total) = neighbors.iter().fold((0.0, 0.0), |(wv, wt), n| {
            let w = (nearest / n.distance).powf(self.params.power);
            (wv + w * self.values[n.index], wt + w)
        });
        Some(weighted / total)
    }

    /// Estimate every cell of `spec` in parallel, collected in cell order
    pub fn interpolate(&self, spec: GridSpec) -> Result<InterpolationGrid> {
        let values: Vec<Option<f64>> = (0..spec.len())
            .into_par_iter()
            .map(|index| {
                let (x, y) = spec.cell_center(index);
                self.estimate(x, y)
            })
            .collect();
        InterpolationGrid::new(spec, values)
    }
}

/// Interpolate planar points onto a grid covering their extent
pub fn interpolate(
    points: &[PlanarPoint],
    grid: &GridConfig,
    idw: &IdwConfig,
) -> Result<InterpolationGrid> {
    let interpolator = IdwInterpolator::fit(points, idw)?;
    let spec = GridSpec::covering(points, grid)?;

    let surface = interpolator.interpolate(spec)?;
    let defined = surface.defined_count();
    tracing::info!(
        points = points.len(),
        rows = spec.rows,
        cols = spec.cols,
        cell_size = spec.cell_size,
        defined,
        undefined = surface.len() - defined,
        "interpolated surface"
    );
    Ok(surface)
}
