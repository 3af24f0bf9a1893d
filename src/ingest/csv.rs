//! CSV harvest reader
//!
//! Header-based, comma separated. Columns are located by name so extra
//! columns (timestamps, moisture, speed) are ignored.

use crate::config::IngestConfig;
use crate::crs::PointSample;
use crate::error::{Error, Result};
use crate::ingest::{SampleReader, SampleSet};

/// Reader for CSV files with latitude, longitude and value columns
#[derive(Debug, Clone)]
pub struct CsvReader {
    lat_column: String,
    lon_column: String,
    value_column: String,
}

impl Default for CsvReader {
    fn default() -> Self {
        Self::from_config(&IngestConfig::default())
    }
}

impl CsvReader {
    pub fn new(lat_column: &str, lon_column: &str, value_column: &str) -> Self {
        Self {
            lat_column: lat_column.to_string(),
            lon_column: lon_column.to_string(),
            value_column: value_column.to_string(),
        }
    }

    pub fn from_config(config: &IngestConfig) -> Self {
        Self::new(&config.lat_column, &config.lon_column, &config.value_column)
    }
}

impl SampleReader for CsvReader {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn parse(&self, content: &str) -> Result<SampleSet> {
        let mut lines = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        let (_, header) = lines
            .next()
            .ok_or_else(|| Error::Ingest("CSV input has no header row".to_string()))?;
        let header = split_record(header.trim_start_matches('\u{feff}'));

        let find = |name: &str| header.iter().position(|h| h == name);
        let (lat_idx, lon_idx, value_idx) = match (
            find(&self.lat_column),
            find(&self.lon_column),
            find(&self.value_column),
        ) {
            (Some(lat), Some(lon), Some(value)) => (lat, lon, value),
            _ => {
                let missing: Vec<&str> = [&self.lat_column, &self.lon_column, &self.value_column]
                    .into_iter()
                    .map(String::as_str)
                    .filter(|name| find(name).is_none())
                    .collect();
                return Err(Error::Ingest(format!("Missing columns: {:?}", missing)));
            }
        };

        let mut samples = Vec::new();
        let mut missing = 0usize;

        for (line_no, line) in lines {
            let fields = split_record(line);
            let field = |i: usize| fields.get(i).map(|s| s.trim()).unwrap_or("");

            let coord = |i: usize, column: &str| -> Result<f64> {
                field(i).parse::<f64>().map_err(|_| {
                    Error::Ingest(format!(
                        "line {}: invalid {} '{}'",
                        line_no + 1,
                        column,
                        field(i)
                    ))
                })
            };
            let lat = coord(lat_idx, &self.lat_column)?;
            let lon = coord(lon_idx, &self.lon_column)?;

            match field(value_idx).parse::<f64>() {
                Ok(value) if value.is_finite() => samples.push(PointSample::new(lon, lat, value)),
                _ => missing += 1,
            }
        }

        if missing > 0 {
            tracing::warn!(
                missing,
                column = %self.value_column,
                "skipped rows with missing values"
            );
        }
        Ok(SampleSet { samples, missing })
    }
}

/// Split one CSV record, honoring double-quoted fields
fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => fields.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());
    fields
}
