//! Regular interpolation lattice

use crate::config::GridConfig;
use crate::crs::PlanarPoint;
use crate::error::{Error, Result, Stage};
use serde::{Deserialize, Serialize};

/// Geometry of a regular grid of cell centres
///
/// Cell `index` sits at row `index / cols`, column `index % cols`; its centre
/// is `origin + (col, row) * cell_size`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub origin_x: f64,
    pub origin_y: f64,
    pub cell_size: f64,
    pub rows: usize,
    pub cols: usize,
}

impl GridSpec {
    /// Grid covering the bounding box of `points` plus the configured margin
    pub fn covering(points: &[PlanarPoint], config: &GridConfig) -> Result<Self> {
        config.validate()?;
        if points.is_empty() {
            return Err(Error::EmptyInput {
                stage: Stage::Interpolate,
            });
        }

        let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in points {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }

        let origin_x = min_x - config.margin;
        let origin_y = min_y - config.margin;
        let width = max_x - min_x + 2.0 * config.margin;
        let height = max_y - min_y + 2.0 * config.margin;

        // Absorb rounding so an extent that is an exact multiple of the cell
        // size still gets its closing row/column
        let cols_f = (width / config.cell_size + 1e-9).floor() + 1.0;
        let rows_f = (height / config.cell_size + 1e-9).floor() + 1.0;

        if cols_f * rows_f > config.max_cells as f64 {
            return Err(Error::invalid_parameter(
                Stage::Interpolate,
                "cell_size",
                format!(
                    "{} m cells over a {:.1} x {:.1} m extent need {} cells, limit is {}",
                    config.cell_size, width, height, cols_f * rows_f, config.max_cells
                ),
            ));
        }

        Ok(Self {
            origin_x,
            origin_y,
            cell_size: config.cell_size,
            rows: rows_f as usize,
            cols: cols_f as usize,
        })
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// (row, col) of a cell index
    pub fn row_col(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }

    /// Planar centre of a cell
    pub fn cell_center(&self, index: usize) -> (f64, f64) {
        let (row, col) = self.row_col(index);
        (
            self.origin_x + col as f64 * self.cell_size,
            self.origin_y + row as f64 * self.cell_size,
        )
    }

    /// Index of the cell whose centre is nearest to `(x, y)`, clamped to the grid
    pub fn nearest_cell(&self, x: f64, y: f64) -> usize {
        let clamp = |v: f64, n: usize| -> usize {
            let i = v.round();
            if i <= 0.0 {
                0
            } else {
                (i as usize).min(n - 1)
            }
        };
        let col = clamp((x - self.origin_x) / self.cell_size, self.cols);
        let row = clamp((y - self.origin_y) / self.cell_size, self.rows);
        row * self.cols + col
    }

    /// Area of one cell in square meters
    pub fn cell_area(&self) -> f64 {
        self.cell_size * self.cell_size
    }
}

/// Interpolated surface: one optional value per cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpolationGrid {
    spec: GridSpec,
    values: Vec<Option<f64>>,
}

impl InterpolationGrid {
    /// Wrap precomputed values; `values.len()` must equal `spec.len()`
    pub fn new(spec: GridSpec, values: Vec<Option<f64>>) -> Result<Self> {
        if values.len() != spec.len() {
            return Err(Error::invalid_parameter(
                Stage::Interpolate,
                "values",
                format!("expected {} cell values, got {}", spec.len(), values.len()),
            ));
        }
        Ok(Self { spec, values })
    }

    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Indices of cells that carry a value, in cell order
    pub fn defined_cells(&self) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|_| i))
            .collect()
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corners() -> Vec<PlanarPoint> {
        vec![
            PlanarPoint::new(0.0, 0.0, 10.0),
            PlanarPoint::new(0.0, 10.0, 10.0),
            PlanarPoint::new(10.0, 0.0, 90.0),
            PlanarPoint::new(10.0, 10.0, 90.0),
        ]
    }

    fn grid_config(cell_size: f64) -> GridConfig {
        GridConfig {
            cell_size,
            ..GridConfig::default()
        }
    }

    #[test]
    fn test_extent_is_covered_inclusively() {
        let spec = GridSpec::covering(&corners(), &grid_config(5.0)).unwrap();
        assert_eq!((spec.rows, spec.cols), (3, 3));
        assert_eq!(spec.cell_center(0), (0.0, 0.0));
        assert_eq!(spec.cell_center(4), (5.0, 5.0));
        assert_eq!(spec.cell_center(8), (10.0, 10.0));
    }

    #[test]
    fn test_margin_extends_origin() {
        let config = GridConfig {
            cell_size: 5.0,
            margin: 5.0,
            ..GridConfig::default()
        };
        let spec = GridSpec::covering(&corners(), &config).unwrap();
        assert_eq!((spec.origin_x, spec.origin_y), (-5.0, -5.0));
        assert_eq!((spec.rows, spec.cols), (5, 5));
    }

    #[test]
    fn test_max_cells_rejects_fine_grid() {
        let config = GridConfig {
            cell_size: 0.001,
            max_cells: 1000,
            ..GridConfig::default()
        };
        match GridSpec::covering(&corners(), &config) {
            Err(Error::InvalidParameter { parameter, .. }) => assert_eq!(parameter, "cell_size"),
            other => panic!("expected InvalidParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_nearest_cell_clamps() {
        let spec = GridSpec::covering(&corners(), &grid_config(5.0)).unwrap();
        assert_eq!(spec.nearest_cell(4.0, 6.0), 4);
        assert_eq!(spec.nearest_cell(-100.0, -100.0), 0);
        assert_eq!(spec.nearest_cell(100.0, 100.0), 8);
    }

    #[test]
    fn test_defined_cells() {
        let spec = GridSpec::covering(&corners(), &grid_config(10.0)).unwrap();
        let grid = InterpolationGrid::new(spec, vec![Some(3.0), None, Some(1.0), None]).unwrap();
        assert_eq!(grid.defined_cells(), vec![0, 2]);
        assert_eq!(grid.defined_count(), 2);
        assert_eq!(grid.value(1), None);

        assert!(InterpolationGrid::new(spec, vec![None]).is_err());
    }
}
