//! Centralized constants for the yield-zones crate
//!
//! Geodetic parameters and unit conversions shared by the projection,
//! statistics and formatting code.

/// WGS84 ellipsoid and UTM projection parameters
pub mod geo {
    /// WGS84 semi-major axis in meters
    pub const WGS84_A: f64 = 6_378_137.0;

    /// WGS84 flattening
    pub const WGS84_F: f64 = 1.0 / 298.257_223_563;

    /// UTM central meridian scale factor
    pub const UTM_K0: f64 = 0.9996;

    /// UTM false easting in meters
    pub const UTM_FALSE_EASTING: f64 = 500_000.0;

    /// UTM false northing for the southern hemisphere in meters
    pub const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

    /// Southern latitude limit of the UTM system
    pub const UTM_MIN_LAT: f64 = -80.0;

    /// Northern latitude limit of the UTM system
    pub const UTM_MAX_LAT: f64 = 84.0;

    /// Mean Earth radius in meters (for haversine sanity checks)
    pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;
}

/// Area units
pub mod units {
    /// Square meters per hectare
    pub const SQ_METERS_PER_HECTARE: f64 = 10_000.0;
}
