//! yield-zones: Yield Map Interpolation and Management Zones
//!
//! A library and CLI tool that turns geolocated crop-yield samples into a
//! continuous yield surface and a small set of ranked management zones.
//!
//! ## Features
//!
//! - Projection of longitude/latitude samples into the UTM zone of the field
//! - Inverse distance weighted interpolation onto a regular grid
//! - Seeded k-means zoning with silhouette-based zone count selection
//! - Per-zone statistics, convex-hull geometry and ranking
//! - CSV / GeoJSON ingestion with optional field-boundary clipping
//! - JSON / GeoJSON / text output
//!
//! ## Quick Start
//!
//! ```rust
//! use yield_zones::analysis::analyze;
//! use yield_zones::config::AnalysisConfig;
//! use yield_zones::crs::PointSample;
//!
//! let mut samples = Vec::new();
//! for row in 0..10 {
//!     for col in 0..10 {
//!         let value = if col < 5 { 60.0 } else { 95.0 };
//!         samples.push(PointSample::new(
//!             -49.5 + col as f64 * 0.0001,
//!             -20.5 + row as f64 * 0.0001,
//!             value,
//!         ));
//!     }
//! }
//!
//! let result = analyze(&samples, &AnalysisConfig::default()).unwrap();
//! for zone in &result.zones {
//!     println!("{}: {:.1} t/ha over {:.2} ha", zone.name, zone.mean, zone.area_ha);
//! }
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod constants;
pub mod crs;
pub mod error;
pub mod format;
pub mod ingest;
pub mod interpolate;
pub mod spatial;
pub mod zones;

// Re-export commonly used types
pub use analysis::{analyze, analyze_planar, AnalysisResult};
pub use config::{AnalysisConfig, Config};
pub use crs::{PlanarDataset, PlanarPoint, PointSample};
pub use error::{Error, Result};
pub use zones::Zone;
