//! End-to-end analysis pipeline
//!
//! normalize -> interpolate -> delineate -> summarize. Each stage reads the
//! previous stage's output and never modifies it.

use crate::config::AnalysisConfig;
use crate::crs::{Normalize, PlanarDataset, PointSample, UtmZone};
use crate::error::Result;
use crate::interpolate::{interpolate, InterpolationGrid};
use crate::zones::{delineate, summarize, CandidateScore, DegenerateNote, Zone};
use serde::{Deserialize, Serialize};

/// Immutable outcome of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Projection every planar coordinate below is expressed in
    pub projection: UtmZone,
    pub input_points: usize,
    pub grid: InterpolationGrid,
    /// Ranked zone label (0-based) per grid cell
    pub labels: Vec<Option<usize>>,
    /// Zones ordered from lowest to highest mean
    pub zones: Vec<Zone>,
    pub k: usize,
    /// Mean silhouette of the selected k; `None` when undefined
    pub quality: Option<f64>,
    pub candidates: Vec<CandidateScore>,
    pub degenerate: Option<DegenerateNote>,
}

impl AnalysisResult {
    /// Convert a planar vertex back to (lon, lat) degrees
    pub fn to_geographic(&self, x: f64, y: f64) -> (f64, f64) {
        self.projection.inverse(x, y)
    }
}

/// Analyze geographic samples
pub fn analyze(samples: &[PointSample], config: &AnalysisConfig) -> Result<AnalysisResult> {
    config.validate()?;
    let dataset = samples.normalize()?;
    analyze_planar(&dataset, config)
}

/// Analyze an already normalized dataset
pub fn analyze_planar(dataset: &PlanarDataset, config: &AnalysisConfig) -> Result<AnalysisResult> {
    config.validate()?;
    let span = tracing::info_span!("analyze", zone = %dataset.zone(), points = dataset.len());
    let _enter = span.enter();

    let dataset = dataset.normalize()?;
    let points = dataset.points();

    let grid = interpolate(points, &config.grid, &config.idw)?;
    let delineation = delineate(&grid, &config.zones)?;
    let zones = summarize(&grid, &delineation.labels, delineation.k, points)?;

    tracing::info!(
        k = delineation.k,
        quality = ?delineation.quality,
        degenerate = delineation.degenerate.is_some(),
        "analysis complete"
    );

    Ok(AnalysisResult {
        projection: dataset.zone(),
        input_points: points.len(),
        grid,
        labels: delineation.labels,
        zones,
        k: delineation.k,
        quality: delineation.quality,
        candidates: delineation.candidates,
        degenerate: delineation.degenerate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::{Hemisphere, PlanarPoint};
    use crate::error::Error;

    fn zone() -> UtmZone {
        UtmZone::new(22, Hemisphere::South).unwrap()
    }

    /// West half low, east half high, on a 5 m sample lattice
    fn two_halves() -> PlanarDataset {
        let mut points = Vec::new();
        for row in 0..20 {
            for col in 0..20 {
                let value = if col < 10 { 40.0 } else { 120.0 };
                points.push(PlanarPoint::new(
                    400_000.0 + col as f64 * 5.0,
                    7_700_000.0 + row as f64 * 5.0,
                    value,
                ));
            }
        }
        PlanarDataset::from_planar(zone(), points)
    }

    fn config() -> AnalysisConfig {
        let mut config = AnalysisConfig::default();
        config.grid.cell_size = 5.0;
        config.idw.max_neighbors = 4;
        config.idw.search_radius = 20.0;
        config
    }

    #[test]
    fn test_two_halves_make_two_zones() {
        let result = analyze_planar(&two_halves(), &config()).unwrap();

        assert_eq!(result.projection, zone());
        assert_eq!(result.input_points, 400);
        assert_eq!(result.k, 2);
        assert!(result.degenerate.is_none());
        assert!(result.quality.unwrap() > 0.5);
        assert_eq!(result.zones.len(), 2);
        assert!(result.zones[0].mean < result.zones[1].mean);
        assert_eq!(result.zones[0].point_count + result.zones[1].point_count, 400);
    }

    #[test]
    fn test_zones_cover_defined_cells_exactly() {
        let result = analyze_planar(&two_halves(), &config()).unwrap();
        let mut cells: Vec<usize> = result.zones.iter().flat_map(|z| z.cells.clone()).collect();
        cells.sort_unstable();
        assert_eq!(cells, result.grid.defined_cells());

        let fractions: f64 = result.zones.iter().map(|z| z.area_fraction).sum();
        assert!((fractions - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_geographic_pipeline() {
        let mut samples = Vec::new();
        for row in 0..12 {
            for col in 0..12 {
                let value = if row < 6 { 55.0 } else { 95.0 };
                samples.push(PointSample::new(
                    -49.5 + col as f64 * 0.0001,
                    -20.5 + row as f64 * 0.0001,
                    value,
                ));
            }
        }
        let result = analyze(&samples, &config()).unwrap();
        assert_eq!(result.projection.number, 22);
        assert!(result.k >= 2);
        assert_eq!(result.zones.len(), result.k);
        let first = &result.zones[0];
        let last = &result.zones[result.k - 1];
        assert!(first.mean < last.mean);

        let (x, y) = result.zones[0].geometry[0];
        let (lon, lat) = result.to_geographic(x, y);
        assert!((lon + 49.5).abs() < 0.01 && (lat + 20.5).abs() < 0.01);
    }

    #[test]
    fn test_invalid_config_is_rejected_before_work() {
        let mut bad = config();
        bad.zones.max_zones = 1;
        assert!(matches!(
            analyze_planar(&two_halves(), &bad),
            Err(Error::InvalidParameter { parameter: "max_zones", .. })
        ));
        assert!(matches!(
            analyze(&[], &config()),
            Err(Error::EmptyInput { .. })
        ));
    }
}
