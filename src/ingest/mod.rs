//! Sample ingestion
//!
//! This module defines the `SampleReader` trait and the readers that turn
//! harvest files into `PointSample`s, plus boundary clipping, record
//! validation and IQR outlier cleaning applied before analysis.
//!
//! ## Flex Point
//! Adding a new input format requires:
//! 1. Create `src/ingest/{format}.rs` implementing `SampleReader`
//! 2. Add `pub mod {format};` below
//! 3. Register its extensions in `reader_for_path` and `available_readers`

pub mod boundary;
pub mod csv;
pub mod geojson;

pub use boundary::{clip_to_boundary, Boundary, BoundaryPolygon};

use crate::config::IngestConfig;
use crate::crs::PointSample;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Samples read from a source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSet {
    /// Usable samples, in file order
    pub samples: Vec<PointSample>,
    /// Records skipped for a missing or non-numeric value
    pub missing: usize,
}

/// Trait for harvest file readers
pub trait SampleReader: Send + Sync {
    /// Reader name (e.g., "csv", "geojson")
    fn name(&self) -> &'static str;

    /// Parse file content into samples, in file order
    fn parse(&self, content: &str) -> Result<SampleSet>;

    /// Read and parse a file
    fn read(&self, path: &Path) -> Result<SampleSet> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Ingest(format!("Failed to read {}: {}", path.display(), e)))?;
        let set = self.parse(&content)?;
        tracing::info!(
            reader = self.name(),
            path = %path.display(),
            points = set.samples.len(),
            missing = set.missing,
            "loaded samples"
        );
        Ok(set)
    }
}

/// Information about a reader
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderInfo {
    pub name: String,
    pub extensions: Vec<String>,
}

/// Pick a reader from the file extension
pub fn reader_for_path(path: &Path, config: &IngestConfig) -> Result<Box<dyn SampleReader>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => Ok(Box::new(csv::CsvReader::from_config(config))),
        "geojson" | "json" => Ok(Box::new(geojson::GeoJsonReader::new(&config.value_column))),
        _ => Err(Error::Ingest(format!(
            "Unknown file extension '{}' for {} (expected csv, geojson or json)",
            ext,
            path.display()
        ))),
    }
}

/// List all available readers
pub fn available_readers() -> Vec<ReaderInfo> {
    vec![
        ReaderInfo {
            name: "csv".to_string(),
            extensions: vec!["csv".to_string()],
        },
        ReaderInfo {
            name: "geojson".to_string(),
            extensions: vec!["geojson".to_string(), "json".to_string()],
        },
    ]
}

/// Geographic extent of a sample set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

/// Summary statistics of sample values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1)
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub below_min: usize,
    pub above_max: usize,
    pub bounds: Bounds,
}

/// Outcome of dataset validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Records dropped by the reader for a missing value
    pub missing: usize,
    pub summary: Option<SampleSummary>,
}

/// Check point count and value plausibility
///
/// `missing` is the reader's count of records without a usable value.
pub fn validate(
    samples: &[PointSample],
    missing: usize,
    config: &IngestConfig,
) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if missing > 0 {
        warnings.push(format!("{} points with missing values", missing));
    }

    if samples.len() < config.min_points {
        errors.push(format!(
            "Insufficient points: {} (min: {})",
            samples.len(),
            config.min_points
        ));
    }

    let summary = summarize(samples, config);
    if let Some(s) = &summary {
        if s.below_min > 0 {
            warnings.push(format!(
                "{} points below minimum value ({})",
                s.below_min, config.value_min
            ));
        }
        if s.above_max > 0 {
            warnings.push(format!(
                "{} points above maximum value ({})",
                s.above_max, config.value_max
            ));
        }
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
        warnings,
        missing,
        summary,
    }
}

fn summarize(samples: &[PointSample], config: &IngestConfig) -> Option<SampleSummary> {
    if samples.is_empty() {
        return None;
    }

    let mut values: Vec<f64> = samples.iter().map(|s| s.value).collect();
    values.sort_by(f64::total_cmp);

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = if values.len() > 1 {
        (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
    } else {
        0.0
    };

    let bounds = samples.iter().fold(
        Bounds {
            min_lon: f64::INFINITY,
            min_lat: f64::INFINITY,
            max_lon: f64::NEG_INFINITY,
            max_lat: f64::NEG_INFINITY,
        },
        |b, s| Bounds {
            min_lon: b.min_lon.min(s.lon),
            min_lat: b.min_lat.min(s.lat),
            max_lon: b.max_lon.max(s.lon),
            max_lat: b.max_lat.max(s.lat),
        },
    );

    Some(SampleSummary {
        count: values.len(),
        mean,
        std,
        min: values[0],
        max: values[values.len() - 1],
        median: quantile(&values, 0.5),
        below_min: values.iter().filter(|&&v| v < config.value_min).count(),
        above_max: values.iter().filter(|&&v| v > config.value_max).count(),
        bounds,
    })
}

/// Linear-interpolated quantile of sorted values
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Drop samples outside `[Q1 - f * IQR, Q3 + f * IQR]`, keeping order
pub fn clean_outliers(samples: &[PointSample], iqr_factor: f64) -> Vec<PointSample> {
    if samples.is_empty() {
        return Vec::new();
    }

    let mut values: Vec<f64> = samples.iter().map(|s| s.value).collect();
    values.sort_by(f64::total_cmp);
    let q1 = quantile(&values, 0.25);
    let q3 = quantile(&values, 0.75);
    let iqr = q3 - q1;
    let lower = q1 - iqr_factor * iqr;
    let upper = q3 + iqr_factor * iqr;

    let kept: Vec<PointSample> = samples
        .iter()
        .filter(|s| s.value >= lower && s.value <= upper)
        .copied()
        .collect();

    let removed = samples.len() - kept.len();
    if removed > 0 {
        tracing::info!(
            removed,
            percent = removed as f64 / samples.len() as f64 * 100.0,
            lower,
            upper,
            "removed outliers"
        );
    } else {
        tracing::debug!("no outliers found");
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    fn samples(values: &[f64]) -> Vec<PointSample> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| PointSample::new(-49.5 + i as f64 * 1e-4, -20.5, v))
            .collect()
    }

    #[test]
    fn test_quantile() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(quantile(&sorted, 0.25), 1.75);
        assert_relative_eq!(quantile(&sorted, 0.5), 2.5);
        assert_relative_eq!(quantile(&sorted, 1.0), 4.0);
        assert!(quantile(&[], 0.5).is_nan());
    }

    #[test]
    fn test_clean_outliers() {
        let mut values: Vec<f64> = (0..20).map(|i| 50.0 + i as f64).collect();
        values.push(1000.0);
        values.insert(3, -500.0);
        let cleaned = clean_outliers(&samples(&values), 3.0);

        assert_eq!(cleaned.len(), 20);
        assert!(cleaned.iter().all(|s| s.value >= 50.0 && s.value < 70.0));
        // Order preserved
        assert!(cleaned.windows(2).all(|w| w[0].value < w[1].value));
    }

    #[test]
    fn test_clean_outliers_keeps_clean_data() {
        let values = [5.0, 6.0, 7.0, 8.0];
        assert_eq!(clean_outliers(&samples(&values), 3.0).len(), 4);
    }

    #[test]
    fn test_validate() {
        let config = IngestConfig {
            min_points: 5,
            ..IngestConfig::default()
        };
        let report = validate(&samples(&[10.0, 20.0, 250.0, -1.0]), 2, &config);

        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.warnings.len(), 3);
        assert_eq!(report.warnings[0], "2 points with missing values");
        assert_eq!(report.missing, 2);
        let summary = report.summary.unwrap();
        assert_eq!(summary.count, 4);
        assert_eq!(summary.below_min, 1);
        assert_eq!(summary.above_max, 1);
        assert_relative_eq!(summary.median, 15.0);
        assert_eq!(summary.min, -1.0);
        assert_eq!(summary.bounds.min_lat, -20.5);
    }

    #[test]
    fn test_validate_passes() {
        let config = IngestConfig {
            min_points: 3,
            ..IngestConfig::default()
        };
        let report = validate(&samples(&[1.0, 2.0, 3.0]), 0, &config);
        assert!(report.valid);
        assert!(report.warnings.is_empty());
        assert_relative_eq!(report.summary.unwrap().std, 1.0);
    }

    #[test]
    fn test_reader_for_path() {
        let config = IngestConfig::default();
        assert_eq!(reader_for_path(Path::new("a.csv"), &config).unwrap().name(), "csv");
        assert_eq!(reader_for_path(Path::new("a.GeoJSON"), &config).unwrap().name(), "geojson");
        assert_eq!(reader_for_path(Path::new("a.json"), &config).unwrap().name(), "geojson");
        assert!(matches!(
            reader_for_path(Path::new("field.shp"), &config),
            Err(Error::Ingest(_))
        ));
        assert!(reader_for_path(Path::new("noext"), &config).is_err());
    }

    #[test]
    fn test_read_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("harvest.csv");
        fs::write(&path, "latitude,longitude,yield\n-20.5,-49.5,80.0\n").unwrap();

        let reader = reader_for_path(&path, &IngestConfig::default()).unwrap();
        let set = reader.read(&path).unwrap();
        assert_eq!(set.samples, vec![PointSample::new(-49.5, -20.5, 80.0)]);
        assert_eq!(set.missing, 0);

        assert!(reader.read(&temp_dir.path().join("missing.csv")).is_err());
    }
}
