//! Human-readable text output formatter

use crate::config::Config;
use crate::error::Result;
use crate::format::{AnalysisReport, OutputFormatter};
use crate::zones::CandidateStatus;

/// Text formatter - outputs human-readable summary
pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable text"
    }

    fn format(&self, report: &AnalysisReport, _config: &Config) -> Result<String> {
        let result = &report.result;
        let spec = result.grid.spec();
        let mut output = String::new();

        // Header
        output.push_str(&format!("yield-zones analysis ({})\n", report.id));
        output.push_str(&format!("Source: {}\n", report.source));
        let input = &report.input;
        output.push_str(&format!(
            "Points: {} loaded, {} missing values, {} outside boundary, \
             {} outliers removed, {} analyzed\n",
            input.loaded,
            input.missing_values,
            input.outside_boundary,
            input.removed_outliers,
            input.analyzed
        ));
        if let Some(validation) = &report.input.validation {
            for warning in &validation.warnings {
                output.push_str(&format!("Warning: {}\n", warning));
            }
        }
        output.push_str(&format!(
            "Projection: {} (EPSG:{})\n",
            result.projection,
            result.projection.epsg()
        ));
        output.push_str(&format!(
            "Grid: {} x {} cells at {} m, {} defined\n\n",
            spec.cols,
            spec.rows,
            spec.cell_size,
            result.grid.defined_count()
        ));

        // Candidate scores
        output.push_str("Zone count selection:\n");
        for candidate in &result.candidates {
            let marker = if candidate.k == result.k { " *" } else { "" };
            match (candidate.status, candidate.silhouette) {
                (CandidateStatus::Scored, Some(s)) => {
                    output.push_str(&format!("  k={}: silhouette {:.3}{}\n", candidate.k, s, marker))
                }
                (status, _) => {
                    output.push_str(&format!("  k={}: {}{}\n", candidate.k, status, marker))
                }
            }
        }
        match result.quality {
            Some(q) => output.push_str(&format!("Selected: {} zones (silhouette {:.3})\n", result.k, q)),
            None => output.push_str(&format!("Selected: {} zones (quality undefined)\n", result.k)),
        }
        if let Some(note) = &result.degenerate {
            output.push_str(&format!("Note: {}; fell back to k={}\n", note, note.fallback_k));
        }

        // Zones
        output.push_str(&format!(
            "\n{:<8} {:>8} {:>8} {:>20} {:>10}\n",
            "Zone", "Cells", "Points", "Mean +/- Std", "Area (ha)"
        ));
        output.push_str(&format!("{}\n", "-".repeat(58)));
        for zone in &result.zones {
            output.push_str(&format!(
                "{:<8} {:>8} {:>8} {:>20} {:>10.2}\n",
                zone.name,
                zone.cell_count,
                zone.point_count,
                format!("{:.1} +/- {:.1}", zone.mean, zone.std),
                zone.area_ha
            ));
        }

        Ok(output)
    }
}
