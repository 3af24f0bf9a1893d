//! Coordinate reference normalization
//!
//! Projects geographic samples into a single UTM zone chosen from the point
//! cloud's centroid, so every later distance is a planar distance in meters.
//! One dataset always carries exactly one zone.

pub mod utm;

use crate::constants::geo::{UTM_MAX_LAT, UTM_MIN_LAT};
use crate::error::{Error, Result, Stage};
use serde::{Deserialize, Serialize};
pub use utm::{Hemisphere, UtmZone};

/// A geolocated measurement in geographic degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointSample {
    pub lon: f64,
    pub lat: f64,
    pub value: f64,
}

impl PointSample {
    pub fn new(lon: f64, lat: f64, value: f64) -> Self {
        Self { lon, lat, value }
    }

    /// Validate that the position is projectable
    ///
    /// Longitude: -180 to 180
    /// Latitude: -80 to 84 (UTM coverage)
    pub fn validate(&self, index: usize) -> Result<()> {
        let invalid = |reason: String| Error::InvalidGeometry { index, reason };

        if !self.lon.is_finite() || !self.lat.is_finite() {
            return Err(invalid(format!(
                "non-finite coordinate ({}, {})",
                self.lon, self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(invalid(format!(
                "longitude {} is out of range [-180, 180]",
                self.lon
            )));
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(invalid(format!(
                "latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !(UTM_MIN_LAT..=UTM_MAX_LAT).contains(&self.lat) {
            return Err(invalid(format!(
                "latitude {} is outside UTM coverage [{}, {}]",
                self.lat, UTM_MIN_LAT, UTM_MAX_LAT
            )));
        }
        Ok(())
    }
}

/// A measurement in projected meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

impl PlanarPoint {
    pub fn new(x: f64, y: f64, value: f64) -> Self {
        Self { x, y, value }
    }
}

/// Planar points together with the one projection that produced them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanarDataset {
    zone: UtmZone,
    points: Vec<PlanarPoint>,
}

impl PlanarDataset {
    /// Wrap points that are already in `zone` coordinates
    pub fn from_planar(zone: UtmZone, points: Vec<PlanarPoint>) -> Self {
        Self { zone, points }
    }

    pub fn zone(&self) -> UtmZone {
        self.zone
    }

    pub fn points(&self) -> &[PlanarPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Convert a planar position back to (lon, lat) degrees
    pub fn to_geographic(&self, x: f64, y: f64) -> (f64, f64) {
        self.zone.inverse(x, y)
    }
}

/// Normalization into planar coordinates
///
/// Implemented for geographic samples (projects) and for an already planar
/// dataset (explicit pass-through), so normalizing twice is a no-op.
pub trait Normalize {
    fn normalize(&self) -> Result<PlanarDataset>;
}

impl Normalize for [PointSample] {
    fn normalize(&self) -> Result<PlanarDataset> {
        normalize(self)
    }
}

impl Normalize for Vec<PointSample> {
    fn normalize(&self) -> Result<PlanarDataset> {
        normalize(self)
    }
}

impl Normalize for PlanarDataset {
    fn normalize(&self) -> Result<PlanarDataset> {
        Ok(self.clone())
    }
}

/// Centroid of a sample set as (lon, lat)
///
/// Longitude uses a circular mean so sets straddling the antimeridian stay
/// together.
pub fn centroid(samples: &[PointSample]) -> Option<(f64, f64)> {
    if samples.is_empty() {
        return None;
    }
    let n = samples.len() as f64;
    let lat = samples.iter().map(|s| s.lat).sum::<f64>() / n;
    let (sin_sum, cos_sum) = samples.iter().fold((0.0, 0.0), |(s, c), p| {
        let lon = p.lon.to_radians();
        (s + lon.sin(), c + lon.cos())
    });
    let lon = sin_sum.atan2(cos_sum).to_degrees();
    Some((lon, lat))
}

/// Project geographic samples into the UTM zone of their centroid
///
/// Output point `i` is input sample `i`; the input is not modified.
pub fn normalize(samples: &[PointSample]) -> Result<PlanarDataset> {
    let (lon, lat) = centroid(samples).ok_or(Error::EmptyInput {
        stage: Stage::Normalize,
    })?;

    for (index, sample) in samples.iter().enumerate() {
        sample.validate(index)?;
    }

    let zone = UtmZone::from_lon_lat(lon, lat);
    tracing::info!(
        points = samples.len(),
        centroid_lon = lon,
        centroid_lat = lat,
        %zone,
        "normalized samples to planar coordinates"
    );

    let points = samples
        .iter()
        .map(|s| {
            let (x, y) = zone.forward(s.lon, s.lat);
            PlanarPoint::new(x, y, s.value)
        })
        .collect();

    Ok(PlanarDataset { zone, points })
}
