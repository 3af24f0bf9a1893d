//! Spatial primitives
//!
//! A static k-d tree for bounded nearest-neighbor queries, the convex
//! hull used for zone geometry and the ring test used for boundary clipping.

pub mod hull;
pub mod kdtree;

pub use hull::{convex_hull, point_in_ring, polygon_area};
pub use kdtree::{KdTree, Neighbor};
