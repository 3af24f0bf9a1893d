//! Clustering features for defined grid cells

use crate::interpolate::InterpolationGrid;

/// Row-major feature matrix, one row per defined cell
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    dims: usize,
    data: Vec<f64>,
    /// Grid index of each row
    cells: Vec<usize>,
    /// Raw cell value of each row
    values: Vec<f64>,
}

impl FeatureMatrix {
    /// Standardized value, plus standardized coordinates scaled by
    /// `spatial_weight` when it is positive
    pub fn from_grid(grid: &InterpolationGrid, spatial_weight: f64) -> Self {
        let cells = grid.defined_cells();
        let values: Vec<f64> = cells.iter().filter_map(|&i| grid.value(i)).collect();

        let mut columns = vec![standardize(&values)];
        if spatial_weight > 0.0 {
            let (xs, ys): (Vec<f64>, Vec<f64>) =
                cells.iter().map(|&i| grid.spec().cell_center(i)).unzip();
            for coord in [xs, ys] {
                let scaled = standardize(&coord).into_iter().map(|v| v * spatial_weight).collect();
                columns.push(scaled);
            }
        }

        let dims = columns.len();
        let mut data = Vec::with_capacity(cells.len() * dims);
        for row in 0..cells.len() {
            for column in &columns {
                data.push(column[row]);
            }
        }

        Self {
            dims,
            data,
            cells,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.dims..(i + 1) * self.dims]
    }

    pub fn cells(&self) -> &[usize] {
        &self.cells
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of distinct raw values
    pub fn distinct_values(&self) -> usize {
        let mut sorted = self.values.clone();
        sorted.sort_by(f64::total_cmp);
        sorted.dedup();
        sorted.len()
    }
}

/// Z-scores with population standard deviation; all zeros when constant
pub fn standardize(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = var.sqrt();
    if std == 0.0 || !std.is_finite() {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - mean) / std).collect()
}

/// Squared Euclidean distance
pub fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}
