//! GeoJSON harvest reader
//!
//! Accepts a FeatureCollection of Point features. The measured value is read
//! from a named feature property.

use crate::config::defaults::DEFAULT_VALUE_COLUMN;
use crate::crs::PointSample;
use crate::error::{Error, Result};
use crate::ingest::{SampleReader, SampleSet};
use serde_json::Value;

/// Reader for GeoJSON point collections
#[derive(Debug, Clone)]
pub struct GeoJsonReader {
    value_property: String,
}

impl Default for GeoJsonReader {
    fn default() -> Self {
        Self::new(DEFAULT_VALUE_COLUMN)
    }
}

impl GeoJsonReader {
    pub fn new(value_property: &str) -> Self {
        Self {
            value_property: value_property.to_string(),
        }
    }
}

impl SampleReader for GeoJsonReader {
    fn name(&self) -> &'static str {
        "geojson"
    }

    fn parse(&self, content: &str) -> Result<SampleSet> {
        let root: Value = serde_json::from_str(content)?;

        if root.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
            return Err(Error::Ingest("expected a GeoJSON FeatureCollection".to_string()));
        }
        let features = root
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::Ingest("FeatureCollection has no features array".to_string()))?;

        let mut samples = Vec::with_capacity(features.len());
        let mut missing = 0usize;

        for (i, feature) in features.iter().enumerate() {
            let geometry = feature
                .get("geometry")
                .ok_or_else(|| Error::Ingest(format!("feature {}: missing geometry", i)))?;
            if geometry.get("type").and_then(Value::as_str) != Some("Point") {
                return Err(Error::Ingest(format!(
                    "feature {}: geometry must be a Point",
                    i
                )));
            }

            let position = geometry
                .get("coordinates")
                .and_then(Value::as_array)
                .filter(|c| c.len() >= 2)
                .ok_or_else(|| Error::Ingest(format!("feature {}: invalid coordinates", i)))?;
            let (lon, lat) = match (position[0].as_f64(), position[1].as_f64()) {
                (Some(lon), Some(lat)) => (lon, lat),
                _ => {
                    return Err(Error::Ingest(format!(
                        "feature {}: coordinates must be numbers",
                        i
                    )))
                }
            };

            let value = feature
                .get("properties")
                .and_then(|p| p.get(&self.value_property))
                .and_then(|v| match v {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => s.trim().parse().ok(),
                    _ => None,
                })
                .filter(|v: &f64| v.is_finite());

            match value {
                Some(value) => samples.push(PointSample::new(lon, lat, value)),
                None => missing += 1,
            }
        }

        if missing > 0 {
            tracing::warn!(
                missing,
                property = %self.value_property,
                "skipped features with missing values"
            );
        }
        Ok(SampleSet { samples, missing })
    }
}
