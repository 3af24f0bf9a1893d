//! GeoJSON zone output formatter

use crate::config::Config;
use crate::error::Result;
use crate::format::{AnalysisReport, OutputFormatter};
use serde_json::{json, Value};

/// GeoJSON formatter - one feature per zone in longitude/latitude
///
/// Zone hulls become closed Polygon rings. A hull that collapsed to one or
/// two vertices is written as a MultiPoint.
pub struct GeoJsonFormatter;

impl OutputFormatter for GeoJsonFormatter {
    fn name(&self) -> &str {
        "geojson"
    }

    fn description(&self) -> &str {
        "Zone polygons as a GeoJSON FeatureCollection"
    }

    fn format(&self, report: &AnalysisReport, _config: &Config) -> Result<String> {
        let result = &report.result;

        let features: Vec<Value> = result
            .zones
            .iter()
            .map(|zone| {
                let mut ring: Vec<[f64; 2]> = zone
                    .geometry
                    .iter()
                    .map(|&(x, y)| {
                        let (lon, lat) = result.to_geographic(x, y);
                        [lon, lat]
                    })
                    .collect();

                let geometry = if ring.len() >= 3 {
                    ring.push(ring[0]);
                    json!({ "type": "Polygon", "coordinates": [ring] })
                } else {
                    json!({ "type": "MultiPoint", "coordinates": ring })
                };

                json!({
                    "type": "Feature",
                    "geometry": geometry,
                    "properties": {
                        "zone_id": zone.id,
                        "zone_name": zone.name,
                        "cell_count": zone.cell_count,
                        "point_count": zone.point_count,
                        "mean": zone.mean,
                        "std": zone.std,
                        "min": zone.min,
                        "max": zone.max,
                        "area_ha": zone.area_ha,
                        "area_fraction": zone.area_fraction,
                    }
                })
            })
            .collect();

        let collection = json!({
            "type": "FeatureCollection",
            "features": features,
            "properties": {
                "id": report.id,
                "created_at": report.created_at,
                "source": report.source,
                "k": result.k,
                "quality": result.quality,
                "projection": result.projection.to_string(),
                "epsg": result.projection.epsg(),
            }
        });

        Ok(serde_json::to_string_pretty(&collection)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::sample_report;

    #[test]
    fn test_geojson_format() {
        let output = GeoJsonFormatter
            .format(&sample_report(), &Config::default())
            .unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["type"], "FeatureCollection");
        let features = parsed["features"].as_array().unwrap();
        assert_eq!(features.len(), 2);

        let first = &features[0];
        assert_eq!(first["properties"]["zone_id"], 1);
        assert_eq!(first["properties"]["zone_name"], "Zone 1");
        assert_eq!(first["geometry"]["type"], "Polygon");

        let ring = first["geometry"]["coordinates"][0].as_array().unwrap();
        assert!(ring.len() >= 4);
        assert_eq!(ring.first(), ring.last());

        // Vertices are back in geographic degrees near the field
        let lon = ring[0][0].as_f64().unwrap();
        let lat = ring[0][1].as_f64().unwrap();
        assert!((-55.0..-45.0).contains(&lon), "lon {}", lon);
        assert!((-25.0..-15.0).contains(&lat), "lat {}", lat);
        assert_eq!(parsed["properties"]["epsg"], 32722);
    }

    #[test]
    fn test_geojson_formatter_info() {
        assert_eq!(GeoJsonFormatter.name(), "geojson");
        assert!(!GeoJsonFormatter.description().is_empty());
    }
}
