//! JSON output formatter

use crate::config::Config;
use crate::error::Result;
use crate::format::{AnalysisReport, OutputFormatter};

/// JSON formatter - outputs the full report as pretty-printed JSON
///
/// The interpolated grid and per-cell labels are large, so they are only
/// kept when `output.include_grid` is set.
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Full JSON report"
    }

    fn format(&self, report: &AnalysisReport, config: &Config) -> Result<String> {
        let mut value = serde_json::to_value(report)?;
        if !config.output.include_grid {
            if let Some(result) = value.get_mut("result").and_then(|r| r.as_object_mut()) {
                result.remove("grid");
                result.remove("labels");
                if let Some(zones) = result.get_mut("zones").and_then(|z| z.as_array_mut()) {
                    for zone in zones.iter_mut().filter_map(|z| z.as_object_mut()) {
                        zone.remove("cells");
                    }
                }
            }
        }
        Ok(serde_json::to_string_pretty(&value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::sample_report;

    #[test]
    fn test_json_format() {
        let formatter = JsonFormatter;
        let report = sample_report();
        let config = Config::default();

        let output = formatter.format(&report, &config).unwrap();

        // Verify it's valid JSON
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert!(parsed.get("id").is_some());
        assert!(parsed.get("created_at").is_some());
        assert_eq!(parsed["source"], "field.csv");
        assert_eq!(parsed["result"]["k"], 2);
        assert_eq!(parsed["result"]["zones"].as_array().unwrap().len(), 2);
        assert!(parsed["result"].get("grid").is_none());
        assert!(parsed["result"]["zones"][0].get("cells").is_none());
        assert_eq!(parsed["result"]["projection"]["number"], 22);
    }

    #[test]
    fn test_json_includes_grid_on_request() {
        let mut config = Config::default();
        config.output.include_grid = true;

        let output = JsonFormatter.format(&sample_report(), &config).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["result"]["grid"]["spec"]["rows"], 10);
        assert_eq!(parsed["result"]["labels"].as_array().unwrap().len(), 100);
    }

    #[test]
    fn test_json_formatter_info() {
        let formatter = JsonFormatter;
        assert_eq!(formatter.name(), "json");
        assert!(!formatter.description().is_empty());
    }
}
