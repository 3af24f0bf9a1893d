//! Error types for yield-zones

use std::fmt;
use thiserror::Error;

/// Pipeline stage an error was raised from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Normalize,
    Interpolate,
    Delineate,
    Statistics,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normalize => write!(f, "normalize"),
            Self::Interpolate => write!(f, "interpolate"),
            Self::Delineate => write!(f, "delineate"),
            Self::Statistics => write!(f, "statistics"),
        }
    }
}

/// Main error type for yield-zones operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid geometry at point {index}: {reason}")]
    InvalidGeometry { index: usize, reason: String },

    #[error("Empty input: no points supplied to {stage}")]
    EmptyInput { stage: Stage },

    #[error("Insufficient data in {stage}: {found} usable points, at least {required} required")]
    InsufficientData {
        stage: Stage,
        found: usize,
        required: usize,
    },

    #[error("Invalid parameter `{parameter}` in {stage}: {reason}")]
    InvalidParameter {
        stage: Stage,
        parameter: &'static str,
        reason: String,
    },

    #[error(
        "Degenerate input: {defined_cells} defined cells cannot form {min_zones} zones \
         of at least {min_cells_per_zone} cells"
    )]
    DegenerateInput {
        defined_cells: usize,
        min_zones: usize,
        min_cells_per_zone: usize,
    },

    #[error("Clustering failed: no candidate zone count in {candidates:?} converged within {max_iter} iterations")]
    ClusteringFailed {
        candidates: Vec<usize>,
        max_iter: usize,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ingest error: {0}")]
    Ingest(String),

    #[error("Format error: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for an `InvalidParameter` error
    pub fn invalid_parameter(stage: Stage, parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            stage,
            parameter,
            reason: reason.into(),
        }
    }

    /// The stage this error was raised from, if it came from the analysis core
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::InvalidGeometry { .. } => Some(Stage::Normalize),
            Self::EmptyInput { stage }
            | Self::InsufficientData { stage, .. }
            | Self::InvalidParameter { stage, .. } => Some(*stage),
            Self::DegenerateInput { .. } | Self::ClusteringFailed { .. } => Some(Stage::Delineate),
            _ => None,
        }
    }
}

/// Result type alias for yield-zones operations
pub type Result<T> = std::result::Result<T, Error>;
