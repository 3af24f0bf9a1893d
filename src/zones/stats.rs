//! Per-zone statistics

use crate::constants::units::SQ_METERS_PER_HECTARE;
use crate::crs::PlanarPoint;
use crate::error::{Error, Result, Stage};
use crate::interpolate::InterpolationGrid;
use crate::spatial::{convex_hull, polygon_area};
use serde::{Deserialize, Serialize};

/// One ranked management zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// 1-based rank, lowest mean first
    pub id: usize,
    pub name: String,
    pub cell_count: usize,
    /// Grid indices of member cells, ascending
    pub cells: Vec<usize>,
    /// Input points whose nearest grid cell belongs to this zone
    pub point_count: usize,
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    pub min: f64,
    pub max: f64,
    /// `cell_count * cell_size^2`, in hectares
    pub area_ha: f64,
    /// Share of the classified area
    pub area_fraction: f64,
    /// Convex hull of member cell centres, counter-clockwise, planar meters
    pub geometry: Vec<(f64, f64)>,
    /// Area enclosed by `geometry`, in hectares
    pub hull_area_ha: f64,
}

/// Summarize ranked cell labels into zones ordered by rank
///
/// `points` are the interpolated input points; each is counted in the zone of
/// its nearest grid cell.
pub fn summarize(
    grid: &InterpolationGrid,
    labels: &[Option<usize>],
    k: usize,
    points: &[PlanarPoint],
) -> Result<Vec<Zone>> {
    if labels.len() != grid.len() {
        return Err(Error::invalid_parameter(
            Stage::Statistics,
            "labels",
            format!("expected {} labels, got {}", grid.len(), labels.len()),
        ));
    }

    let mut members: Vec<Vec<usize>> = vec![Vec::new(); k];
    for (cell, label) in labels.iter().enumerate() {
        let Some(label) = *label else { continue };
        if label >= k {
            return Err(Error::invalid_parameter(
                Stage::Statistics,
                "labels",
                format!("label {} at cell {} is not below k = {}", label, cell, k),
            ));
        }
        if grid.value(cell).is_none() {
            return Err(Error::invalid_parameter(
                Stage::Statistics,
                "labels",
                format!("cell {} is labelled but undefined", cell),
            ));
        }
        members[label].push(cell);
    }

    let spec = grid.spec();
    let mut point_counts = vec![0usize; k];
    for p in points {
        if let Some(label) = labels[spec.nearest_cell(p.x, p.y)] {
            point_counts[label] += 1;
        }
    }

    let classified: usize = members.iter().map(Vec::len).sum();
    let cell_area = spec.cell_area();

    members
        .into_iter()
        .enumerate()
        .map(|(rank, cells)| {
            if cells.is_empty() {
                return Err(Error::InsufficientData {
                    stage: Stage::Statistics,
                    found: 0,
                    required: 1,
                });
            }

            let values: Vec<f64> = cells.iter().filter_map(|&c| grid.value(c)).collect();
            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

            let centres: Vec<(f64, f64)> = cells.iter().map(|&c| spec.cell_center(c)).collect();
            let geometry = convex_hull(&centres);

            Ok(Zone {
                id: rank + 1,
                name: format!("Zone {}", rank + 1),
                cell_count: cells.len(),
                point_count: point_counts[rank],
                mean,
                std,
                min,
                max,
                area_ha: cells.len() as f64 * cell_area / SQ_METERS_PER_HECTARE,
                area_fraction: cells.len() as f64 / classified as f64,
                hull_area_ha: polygon_area(&geometry) / SQ_METERS_PER_HECTARE,
                geometry,
                cells,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolate::GridSpec;
    use approx::assert_relative_eq;

    fn grid() -> InterpolationGrid {
        // 2 x 3 lattice, 10 m cells
        let spec = GridSpec {
            origin_x: 0.0,
            origin_y: 0.0,
            cell_size: 10.0,
            rows: 2,
            cols: 3,
        };
        let values = vec![Some(2.0), Some(4.0), None, Some(10.0), Some(10.0), Some(12.0)];
        InterpolationGrid::new(spec, values).unwrap()
    }

    #[test]
    fn test_zone_statistics() {
        let labels = vec![Some(0), Some(0), None, Some(1), Some(1), Some(1)];
        let points = vec![PlanarPoint::new(1.0, 1.0, 2.0), PlanarPoint::new(19.0, 11.0, 10.0)];
        let zones = summarize(&grid(), &labels, 2, &points).unwrap();

        assert_eq!(zones.len(), 2);
        let low = &zones[0];
        assert_eq!(low.id, 1);
        assert_eq!(low.name, "Zone 1");
        assert_eq!(low.cells, vec![0, 1]);
        assert_eq!(low.point_count, 1);
        assert_relative_eq!(low.mean, 3.0);
        assert_relative_eq!(low.std, 1.0);
        assert_relative_eq!(low.area_ha, 0.02);
        assert_relative_eq!(low.area_fraction, 0.4);
        assert_eq!(low.hull_area_ha, 0.0);

        let high = &zones[1];
        assert_eq!(high.cell_count, 3);
        assert_eq!(high.point_count, 1);
        assert_eq!((high.min, high.max), (10.0, 12.0));
        assert_relative_eq!(high.area_fraction, 0.6);
        // One row of centres: the hull collapses to its endpoints
        assert_eq!(high.geometry, vec![(0.0, 10.0), (20.0, 10.0)]);
        assert_eq!(high.hull_area_ha, 0.0);
        assert!(zones[0].mean < zones[1].mean);
    }

    #[test]
    fn test_singleton_std_is_zero() {
        let labels = vec![Some(0), Some(1), None, Some(1), Some(1), Some(1)];
        let zones = summarize(&grid(), &labels, 2, &[]).unwrap();
        assert_eq!(zones[0].std, 0.0);
        assert_eq!(zones[0].geometry, vec![(0.0, 0.0)]);
    }

    #[test]
    fn test_zones_partition_defined_cells() {
        let labels = vec![Some(0), Some(0), None, Some(1), Some(1), Some(1)];
        let zones = summarize(&grid(), &labels, 2, &[]).unwrap();
        let mut all: Vec<usize> = zones.iter().flat_map(|z| z.cells.clone()).collect();
        let total = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), total);
        assert_eq!(all, grid().defined_cells());
    }

    #[test]
    fn test_rejects_inconsistent_labels() {
        let g = grid();
        assert!(summarize(&g, &[Some(0)], 1, &[]).is_err());
        assert!(summarize(&g, &[Some(0), Some(0), Some(0), None, None, None], 1, &[]).is_err());
        assert!(summarize(&g, &[Some(3), None, None, None, None, None], 2, &[]).is_err());
        assert!(matches!(
            summarize(&g, &[Some(0), None, None, None, None, None], 2, &[]),
            Err(Error::InsufficientData { stage: Stage::Statistics, .. })
        ));
    }
}
