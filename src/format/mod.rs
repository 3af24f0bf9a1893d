//! Output formatters
//!
//! Provides trait-based output formatting for analysis reports.

pub mod geojson;
pub mod json;
pub mod text;

use crate::analysis::AnalysisResult;
use crate::config::Config;
use crate::error::Result;
use crate::ingest::ValidationReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What went into the analysis before the core ran
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSummary {
    /// Samples with a usable value read from the source
    pub loaded: usize,
    /// Records skipped by the reader for a missing value
    pub missing_values: usize,
    /// Samples dropped outside the field boundary
    pub outside_boundary: usize,
    /// Samples removed by outlier cleaning
    pub removed_outliers: usize,
    /// Samples handed to the analysis
    pub analyzed: usize,
    /// Validation outcome, if validation ran
    pub validation: Option<ValidationReport>,
}

/// An analysis result with run metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Unique report ID
    pub id: Uuid,
    /// When the analysis finished
    pub created_at: DateTime<Utc>,
    /// Input file or other source name
    pub source: String,
    pub input: InputSummary,
    pub result: AnalysisResult,
}

impl AnalysisReport {
    pub fn new(source: impl Into<String>, input: InputSummary, result: AnalysisResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            source: source.into(),
            input,
            result,
        }
    }
}

/// Information about an output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Format name
    pub name: String,
    /// Format description
    pub description: String,
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Get the format name
    fn name(&self) -> &str;

    /// Get the format description
    fn description(&self) -> &str;

    /// Format the analysis report
    ///
    /// # Arguments
    /// * `report` - The report to format
    /// * `config` - Application config (output options)
    fn format(&self, report: &AnalysisReport, config: &Config) -> Result<String>;
}

/// Get a formatter by name
pub fn get_formatter(name: &str) -> Option<Box<dyn OutputFormatter>> {
    match name.to_lowercase().as_str() {
        "json" => Some(Box::new(json::JsonFormatter)),
        "geojson" => Some(Box::new(geojson::GeoJsonFormatter)),
        "text" => Some(Box::new(text::TextFormatter)),
        _ => None,
    }
}

/// List all available formatters
pub fn available_formats() -> Vec<FormatInfo> {
    [
        &json::JsonFormatter as &dyn OutputFormatter,
        &geojson::GeoJsonFormatter,
        &text::TextFormatter,
    ]
    .iter()
    .map(|f| FormatInfo {
        name: f.name().to_string(),
        description: f.description().to_string(),
    })
    .collect()
}

/// Report over a small planar field, shared by formatter tests
#[cfg(test)]
pub(crate) fn sample_report() -> AnalysisReport {
    use crate::analysis::analyze_planar;
    use crate::config::AnalysisConfig;
    use crate::crs::{Hemisphere, PlanarDataset, PlanarPoint, UtmZone};

    let mut points = Vec::new();
    for row in 0..10 {
        for col in 0..10 {
            let value = if row < 5 { 45.0 } else { 110.0 };
            points.push(PlanarPoint::new(
                300_000.0 + col as f64 * 10.0,
                7_730_000.0 + row as f64 * 10.0,
                value,
            ));
        }
    }
    let zone = UtmZone::new(22, Hemisphere::South).expect("valid zone");
    let dataset = PlanarDataset::from_planar(zone, points);
    let result = analyze_planar(&dataset, &AnalysisConfig::default()).expect("analysis");

    AnalysisReport::new(
        "field.csv",
        InputSummary {
            loaded: 101,
            missing_values: 2,
            outside_boundary: 1,
            removed_outliers: 0,
            analyzed: 100,
            validation: None,
        },
        result,
    )
}
