//! Scattered-point to grid interpolation
//!
//! Builds a regular lattice over the planar point extent and estimates each
//! cell from its nearest neighbors by inverse distance weighting. Cells
//! without enough neighbors in range stay undefined (`None`).

pub mod grid;
pub mod idw;

pub use grid::{GridSpec, InterpolationGrid};
pub use idw::{interpolate, IdwInterpolator};
