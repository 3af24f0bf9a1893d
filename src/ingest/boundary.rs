//! Field boundary reader and clipping
//!
//! A boundary is read from GeoJSON: a Polygon or MultiPolygon geometry, a
//! Feature holding one, or a FeatureCollection of them. Samples outside
//! every polygon are dropped before validation.

use crate::crs::PointSample;
use crate::error::{Error, Result};
use crate::spatial::point_in_ring;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// One polygon of a field boundary, in longitude/latitude degrees
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryPolygon {
    pub exterior: Vec<(f64, f64)>,
    pub holes: Vec<Vec<(f64, f64)>>,
}

impl BoundaryPolygon {
    /// Inside the exterior ring and outside every hole
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        point_in_ring(&self.exterior, lon, lat)
            && !self.holes.iter().any(|hole| point_in_ring(hole, lon, lat))
    }
}

/// Union of boundary polygons
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    polygons: Vec<BoundaryPolygon>,
}

impl Boundary {
    pub fn new(polygons: Vec<BoundaryPolygon>) -> Result<Self> {
        if polygons.is_empty() {
            return Err(Error::Ingest("Boundary has no polygons".to_string()));
        }
        Ok(Self { polygons })
    }

    /// Read a GeoJSON boundary file
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Ingest(format!("Failed to read boundary {}: {}", path.display(), e))
        })?;
        let boundary = Self::parse(&content)?;
        tracing::info!(
            path = %path.display(),
            polygons = boundary.polygons.len(),
            "loaded boundary"
        );
        Ok(boundary)
    }

    /// Parse GeoJSON boundary content
    pub fn parse(content: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(content)?;
        let mut polygons = Vec::new();
        collect_polygons(&root, &mut polygons)?;
        Self::new(polygons)
    }

    pub fn polygons(&self) -> &[BoundaryPolygon] {
        &self.polygons
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.polygons.iter().any(|p| p.contains(lon, lat))
    }
}

/// Keep the samples inside `boundary`, in input order
pub fn clip_to_boundary(samples: &[PointSample], boundary: &Boundary) -> Vec<PointSample> {
    let kept: Vec<PointSample> = samples
        .iter()
        .filter(|s| boundary.contains(s.lon, s.lat))
        .copied()
        .collect();
    tracing::info!(
        kept = kept.len(),
        outside = samples.len() - kept.len(),
        "clipped samples to boundary"
    );
    kept
}

fn collect_polygons(value: &Value, out: &mut Vec<BoundaryPolygon>) -> Result<()> {
    match value.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {
            let features = value
                .get("features")
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    Error::Ingest("FeatureCollection has no features array".to_string())
                })?;
            for feature in features {
                collect_polygons(feature, out)?;
            }
            Ok(())
        }
        Some("Feature") => {
            let geometry = value
                .get("geometry")
                .ok_or_else(|| Error::Ingest("boundary feature has no geometry".to_string()))?;
            collect_polygons(geometry, out)
        }
        Some("Polygon") => {
            out.push(polygon(coordinates(value)?)?);
            Ok(())
        }
        Some("MultiPolygon") => {
            let parts = coordinates(value)?.as_array().ok_or_else(|| {
                Error::Ingest("MultiPolygon coordinates must be an array".to_string())
            })?;
            for part in parts {
                out.push(polygon(part)?);
            }
            Ok(())
        }
        other => Err(Error::Ingest(format!(
            "Boundary must contain polygon geometry, found {}",
            other.unwrap_or("no type")
        ))),
    }
}

fn coordinates(geometry: &Value) -> Result<&Value> {
    geometry
        .get("coordinates")
        .ok_or_else(|| Error::Ingest("boundary geometry has no coordinates".to_string()))
}

fn polygon(rings: &Value) -> Result<BoundaryPolygon> {
    let rings = rings
        .as_array()
        .filter(|r| !r.is_empty())
        .ok_or_else(|| Error::Ingest("polygon must have at least one ring".to_string()))?;
    let mut parsed = rings.iter().map(ring).collect::<Result<Vec<_>>>()?;
    let exterior = parsed.remove(0);
    Ok(BoundaryPolygon {
        exterior,
        holes: parsed,
    })
}

fn ring(value: &Value) -> Result<Vec<(f64, f64)>> {
    let positions = value
        .as_array()
        .ok_or_else(|| Error::Ingest("polygon ring must be an array".to_string()))?;
    let ring = positions
        .iter()
        .map(|p| match p.as_array().map(|c| c.as_slice()) {
            Some([lon, lat, ..]) => match (lon.as_f64(), lat.as_f64()) {
                (Some(lon), Some(lat)) => Ok((lon, lat)),
                _ => Err(Error::Ingest("ring positions must be numbers".to_string())),
            },
            _ => Err(Error::Ingest("ring position needs two coordinates".to_string())),
        })
        .collect::<Result<Vec<_>>>()?;
    if ring.len() < 4 {
        return Err(Error::Ingest(format!(
            "polygon ring has {} positions (min: 4)",
            ring.len()
        )));
    }
    Ok(ring)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FIELD: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {"name": "north block"},
            "geometry": {
                "type": "Polygon",
                "coordinates": [
                    [[-49.6, -20.6], [-49.4, -20.6], [-49.4, -20.4], [-49.6, -20.4], [-49.6, -20.6]],
                    [[-49.52, -20.52], [-49.48, -20.52], [-49.48, -20.48], [-49.52, -20.48], [-49.52, -20.52]]
                ]
            }
        }]
    }"#;

    #[test]
    fn test_polygon_with_hole() {
        let boundary = Boundary::parse(FIELD).unwrap();
        assert_eq!(boundary.polygons().len(), 1);
        assert_eq!(boundary.polygons()[0].holes.len(), 1);

        assert!(boundary.contains(-49.55, -20.55));
        assert!(!boundary.contains(-49.5, -20.5));
        assert!(!boundary.contains(-49.7, -20.5));
    }

    #[test]
    fn test_multipolygon_geometry() {
        let multi = r#"{"type": "MultiPolygon", "coordinates": [
            [[[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]],
            [[[5, 5], [6, 5], [6, 6], [5, 6], [5, 5]]]
        ]}"#;
        let boundary = Boundary::parse(multi).unwrap();
        assert_eq!(boundary.polygons().len(), 2);
        assert!(boundary.contains(0.5, 0.5));
        assert!(boundary.contains(5.5, 5.5));
        assert!(!boundary.contains(3.0, 3.0));
    }

    #[test]
    fn test_clip_keeps_order() {
        let boundary = Boundary::parse(FIELD).unwrap();
        let samples = vec![
            PointSample::new(-49.58, -20.58, 1.0),
            PointSample::new(-49.70, -20.50, 2.0),
            PointSample::new(-49.50, -20.50, 3.0),
            PointSample::new(-49.42, -20.42, 4.0),
        ];
        let clipped = clip_to_boundary(&samples, &boundary);
        assert_eq!(clipped, vec![samples[0], samples[3]]);
    }

    #[test]
    fn test_rejects_non_polygons() {
        let point = r#"{"type": "Feature", "geometry": {"type": "Point", "coordinates": [0, 0]}}"#;
        match Boundary::parse(point) {
            Err(Error::Ingest(msg)) => assert!(msg.contains("polygon geometry")),
            other => panic!("expected Ingest error, got {:?}", other),
        }
        let empty = r#"{"type": "FeatureCollection", "features": []}"#;
        assert!(Boundary::parse(empty).is_err());
        let open = r#"{"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1]]]}"#;
        assert!(Boundary::parse(open).is_err());
    }

    #[test]
    fn test_read_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("boundary.geojson");
        fs::write(&path, FIELD).unwrap();
        assert!(Boundary::read(&path).unwrap().contains(-49.45, -20.45));
        assert!(Boundary::read(&temp_dir.path().join("missing.geojson")).is_err());
    }
}
