//! Management zone delineation
//!
//! Defined grid cells are clustered with seeded k-means for every candidate
//! zone count, each candidate is scored by silhouette, and the best count is
//! kept. Clusters are then ranked by mean value and summarized.

pub mod delineate;
pub mod features;
pub mod kmeans;
pub mod silhouette;
pub mod stats;

pub use delineate::{
    delineate, rank_labels, CandidateScore, CandidateStatus, DegenerateNote, Delineation,
};
pub use stats::{summarize, Zone};
