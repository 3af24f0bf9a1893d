//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/yield-zones/config.toml
//!
//! The analysis sections (`grid`, `idw`, `zones`) are handed to the pipeline
//! as an immutable [`AnalysisConfig`] value; nothing in the core reads
//! process-wide state.

pub mod defaults;

use crate::error::{Error, Result, Stage};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Interpolation grid geometry
    #[serde(default)]
    pub grid: GridConfig,

    /// Inverse distance weighting
    #[serde(default)]
    pub idw: IdwConfig,

    /// Zone delineation
    #[serde(default)]
    pub zones: ZoneConfig,

    /// Sample ingestion
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Interpolation grid geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Cell size in projected meters
    #[serde(default = "default_cell_size")]
    pub cell_size: f64,

    /// Margin added around the point extent in meters
    #[serde(default = "default_margin")]
    pub margin: f64,

    /// Largest grid (rows x cols) a run may allocate
    #[serde(default = "default_max_cells")]
    pub max_cells: usize,
}

/// Inverse distance weighting parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdwConfig {
    /// Distance exponent `p` in `1 / d^p`
    #[serde(default = "default_idw_power")]
    pub power: f64,

    /// Maximum neighbors used per cell
    #[serde(default = "default_max_neighbors")]
    pub max_neighbors: usize,

    /// Minimum neighbors within the search radius for a cell to be defined
    #[serde(default = "default_min_neighbors")]
    pub min_neighbors: usize,

    /// Neighbor search radius in meters
    #[serde(default = "default_search_radius")]
    pub search_radius: f64,

    /// Minimum number of input points
    #[serde(default = "default_min_points")]
    pub min_points: usize,
}

/// Zone delineation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Smallest candidate zone count
    #[serde(default = "default_min_zones")]
    pub min_zones: usize,

    /// Largest candidate zone count
    #[serde(default = "default_max_zones")]
    pub max_zones: usize,

    /// Minimum grid cells in every zone of an accepted candidate
    #[serde(default = "default_min_cells_per_zone")]
    pub min_cells_per_zone: usize,

    /// Weight of standardized planar coordinates against the value
    #[serde(default = "default_spatial_weight")]
    pub spatial_weight: f64,

    /// Seed for k-means initialization and silhouette sampling
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// k-means restarts per candidate
    #[serde(default = "default_n_init")]
    pub n_init: usize,

    /// k-means iteration budget per restart
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,

    /// Convergence threshold on the largest centroid shift
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Scores closer than this to the best do not displace a smaller k
    #[serde(default = "default_tie_tolerance")]
    pub tie_tolerance: f64,

    /// Cells scored by the silhouette metric on large grids
    #[serde(default = "default_silhouette_sample_size")]
    pub silhouette_sample_size: usize,

    /// Raise degenerate input as an error instead of falling back
    #[serde(default)]
    pub strict: bool,
}

/// Sample ingestion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Minimum points for a dataset to pass validation
    #[serde(default = "default_ingest_min_points")]
    pub min_points: usize,

    /// Lowest plausible value
    #[serde(default = "default_value_min")]
    pub value_min: f64,

    /// Highest plausible value
    #[serde(default = "default_value_max")]
    pub value_max: f64,

    /// Remove IQR outliers before analysis
    #[serde(default = "default_true")]
    pub clean_outliers: bool,

    /// IQR multiplier for outlier bounds
    #[serde(default = "default_iqr_factor")]
    pub iqr_factor: f64,

    /// CSV latitude column
    #[serde(default = "default_lat_column")]
    pub lat_column: String,

    /// CSV longitude column
    #[serde(default = "default_lon_column")]
    pub lon_column: String,

    /// CSV column / GeoJSON property holding the measured value
    #[serde(default = "default_value_column")]
    pub value_column: String,
}

/// Output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format
    #[serde(default = "default_format")]
    pub format: String,

    /// Include the interpolated grid in JSON output
    #[serde(default)]
    pub include_grid: bool,
}

/// Immutable parameter bundle consumed by the analysis pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub grid: GridConfig,
    pub idw: IdwConfig,
    pub zones: ZoneConfig,
}

// Default value functions for serde
fn default_cell_size() -> f64 {
    DEFAULT_CELL_SIZE
}
fn default_margin() -> f64 {
    DEFAULT_MARGIN
}
fn default_max_cells() -> usize {
    DEFAULT_MAX_CELLS
}
fn default_idw_power() -> f64 {
    DEFAULT_IDW_POWER
}
fn default_max_neighbors() -> usize {
    DEFAULT_MAX_NEIGHBORS
}
fn default_min_neighbors() -> usize {
    DEFAULT_MIN_NEIGHBORS
}
fn default_search_radius() -> f64 {
    DEFAULT_SEARCH_RADIUS
}
fn default_min_points() -> usize {
    DEFAULT_MIN_POINTS
}
fn default_min_zones() -> usize {
    DEFAULT_MIN_ZONES
}
fn default_max_zones() -> usize {
    DEFAULT_MAX_ZONES
}
fn default_min_cells_per_zone() -> usize {
    DEFAULT_MIN_CELLS_PER_ZONE
}
fn default_spatial_weight() -> f64 {
    DEFAULT_SPATIAL_WEIGHT
}
fn default_seed() -> u64 {
    DEFAULT_SEED
}
fn default_n_init() -> usize {
    DEFAULT_N_INIT
}
fn default_max_iter() -> usize {
    DEFAULT_MAX_ITER
}
fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}
fn default_tie_tolerance() -> f64 {
    DEFAULT_TIE_TOLERANCE
}
fn default_silhouette_sample_size() -> usize {
    DEFAULT_SILHOUETTE_SAMPLE_SIZE
}
fn default_ingest_min_points() -> usize {
    DEFAULT_INGEST_MIN_POINTS
}
fn default_value_min() -> f64 {
    DEFAULT_VALUE_MIN
}
fn default_value_max() -> f64 {
    DEFAULT_VALUE_MAX
}
fn default_true() -> bool {
    true
}
fn default_iqr_factor() -> f64 {
    DEFAULT_IQR_FACTOR
}
fn default_lat_column() -> String {
    DEFAULT_LAT_COLUMN.to_string()
}
fn default_lon_column() -> String {
    DEFAULT_LON_COLUMN.to_string()
}
fn default_value_column() -> String {
    DEFAULT_VALUE_COLUMN.to_string()
}
fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: default_cell_size(),
            margin: default_margin(),
            max_cells: default_max_cells(),
        }
    }
}

impl Default for IdwConfig {
    fn default() -> Self {
        Self {
            power: default_idw_power(),
            max_neighbors: default_max_neighbors(),
            min_neighbors: default_min_neighbors(),
            search_radius: default_search_radius(),
            min_points: default_min_points(),
        }
    }
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            min_zones: default_min_zones(),
            max_zones: default_max_zones(),
            min_cells_per_zone: default_min_cells_per_zone(),
            spatial_weight: default_spatial_weight(),
            seed: default_seed(),
            n_init: default_n_init(),
            max_iter: default_max_iter(),
            tolerance: default_tolerance(),
            tie_tolerance: default_tie_tolerance(),
            silhouette_sample_size: default_silhouette_sample_size(),
            strict: false,
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            min_points: default_ingest_min_points(),
            value_min: default_value_min(),
            value_max: default_value_max(),
            clean_outliers: true,
            iqr_factor: default_iqr_factor(),
            lat_column: default_lat_column(),
            lon_column: default_lon_column(),
            value_column: default_value_column(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            include_grid: false,
        }
    }
}

impl GridConfig {
    /// Check grid geometry parameters
    pub fn validate(&self) -> Result<()> {
        let stage = Stage::Interpolate;
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(Error::invalid_parameter(
                stage,
                "cell_size",
                format!("must be a positive number, got {}", self.cell_size),
            ));
        }
        if !(self.margin.is_finite() && self.margin >= 0.0) {
            return Err(Error::invalid_parameter(
                stage,
                "margin",
                format!("must be non-negative, got {}", self.margin),
            ));
        }
        if self.max_cells == 0 {
            return Err(Error::invalid_parameter(stage, "max_cells", "must be at least 1"));
        }
        Ok(())
    }
}

impl IdwConfig {
    /// Check interpolation parameters
    pub fn validate(&self) -> Result<()> {
        let stage = Stage::Interpolate;
        if !(self.power.is_finite() && self.power > 0.0) {
            return Err(Error::invalid_parameter(
                stage,
                "power",
                format!("must be positive, got {}", self.power),
            ));
        }
        if !(self.search_radius > 0.0) {
            return Err(Error::invalid_parameter(
                stage,
                "search_radius",
                format!("must be positive, got {}", self.search_radius),
            ));
        }
        if self.max_neighbors == 0 {
            return Err(Error::invalid_parameter(stage, "max_neighbors", "must be at least 1"));
        }
        if self.min_neighbors == 0 || self.min_neighbors > self.max_neighbors {
            return Err(Error::invalid_parameter(
                stage,
                "min_neighbors",
                format!(
                    "must be between 1 and max_neighbors ({}), got {}",
                    self.max_neighbors, self.min_neighbors
                ),
            ));
        }
        if self.min_points == 0 {
            return Err(Error::invalid_parameter(stage, "min_points", "must be at least 1"));
        }
        Ok(())
    }
}

impl ZoneConfig {
    /// Check delineation parameters
    pub fn validate(&self) -> Result<()> {
        let stage = Stage::Delineate;
        if self.min_zones == 0 {
            return Err(Error::invalid_parameter(stage, "min_zones", "must be at least 1"));
        }
        if self.max_zones < self.min_zones {
            return Err(Error::invalid_parameter(
                stage,
                "max_zones",
                format!(
                    "must not be below min_zones ({}), got {}",
                    self.min_zones, self.max_zones
                ),
            ));
        }
        if self.min_cells_per_zone == 0 {
            return Err(Error::invalid_parameter(stage, "min_cells_per_zone", "must be at least 1"));
        }
        if !(self.spatial_weight.is_finite() && self.spatial_weight >= 0.0) {
            return Err(Error::invalid_parameter(
                stage,
                "spatial_weight",
                format!("must be non-negative, got {}", self.spatial_weight),
            ));
        }
        if self.n_init == 0 {
            return Err(Error::invalid_parameter(stage, "n_init", "must be at least 1"));
        }
        if self.max_iter == 0 {
            return Err(Error::invalid_parameter(stage, "max_iter", "must be at least 1"));
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(Error::invalid_parameter(stage, "tolerance", "must be non-negative"));
        }
        if !(self.tie_tolerance.is_finite() && self.tie_tolerance >= 0.0) {
            return Err(Error::invalid_parameter(stage, "tie_tolerance", "must be non-negative"));
        }
        if self.silhouette_sample_size < 2 {
            return Err(Error::invalid_parameter(
                stage,
                "silhouette_sample_size",
                "must be at least 2",
            ));
        }
        Ok(())
    }
}

impl AnalysisConfig {
    /// Check every section
    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        self.idw.validate()?;
        self.zones.validate()
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific path, creating it if missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

            toml::from_str(&content)
                .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// The immutable parameter bundle for one analysis run
    pub fn analysis(&self) -> AnalysisConfig {
        AnalysisConfig {
            grid: self.grid.clone(),
            idw: self.idw.clone(),
            zones: self.zones.clone(),
        }
    }

    /// Check that all analysis and ingest values are usable
    pub fn validate(&self) -> Result<()> {
        self.analysis().validate()?;
        if self.ingest.value_min > self.ingest.value_max {
            return Err(Error::Config(format!(
                "ingest.value_min ({}) exceeds ingest.value_max ({})",
                self.ingest.value_min, self.ingest.value_max
            )));
        }
        if !(self.ingest.iqr_factor > 0.0) {
            return Err(Error::Config(format!(
                "ingest.iqr_factor must be positive, got {}",
                self.ingest.iqr_factor
            )));
        }
        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["grid", "cell_size"] => Some(self.grid.cell_size.to_string()),
            ["grid", "margin"] => Some(self.grid.margin.to_string()),
            ["grid", "max_cells"] => Some(self.grid.max_cells.to_string()),

            ["idw", "power"] => Some(self.idw.power.to_string()),
            ["idw", "max_neighbors"] => Some(self.idw.max_neighbors.to_string()),
            ["idw", "min_neighbors"] => Some(self.idw.min_neighbors.to_string()),
            ["idw", "search_radius"] => Some(self.idw.search_radius.to_string()),
            ["idw", "min_points"] => Some(self.idw.min_points.to_string()),

            ["zones", "min_zones"] => Some(self.zones.min_zones.to_string()),
            ["zones", "max_zones"] => Some(self.zones.max_zones.to_string()),
            ["zones", "min_cells_per_zone"] => Some(self.zones.min_cells_per_zone.to_string()),
            ["zones", "spatial_weight"] => Some(self.zones.spatial_weight.to_string()),
            ["zones", "seed"] => Some(self.zones.seed.to_string()),
            ["zones", "n_init"] => Some(self.zones.n_init.to_string()),
            ["zones", "max_iter"] => Some(self.zones.max_iter.to_string()),
            ["zones", "tolerance"] => Some(self.zones.tolerance.to_string()),
            ["zones", "tie_tolerance"] => Some(self.zones.tie_tolerance.to_string()),
            ["zones", "silhouette_sample_size"] => {
                Some(self.zones.silhouette_sample_size.to_string())
            }
            ["zones", "strict"] => Some(self.zones.strict.to_string()),

            ["ingest", "min_points"] => Some(self.ingest.min_points.to_string()),
            ["ingest", "value_min"] => Some(self.ingest.value_min.to_string()),
            ["ingest", "value_max"] => Some(self.ingest.value_max.to_string()),
            ["ingest", "clean_outliers"] => Some(self.ingest.clean_outliers.to_string()),
            ["ingest", "iqr_factor"] => Some(self.ingest.iqr_factor.to_string()),
            ["ingest", "lat_column"] => Some(self.ingest.lat_column.clone()),
            ["ingest", "lon_column"] => Some(self.ingest.lon_column.clone()),
            ["ingest", "value_column"] => Some(self.ingest.value_column.clone()),

            ["output", "format"] => Some(self.output.format.clone()),
            ["output", "include_grid"] => Some(self.output.include_grid.to_string()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["grid", "cell_size"] => self.grid.cell_size = parse_value(key, value)?,
            ["grid", "margin"] => self.grid.margin = parse_value(key, value)?,
            ["grid", "max_cells"] => self.grid.max_cells = parse_value(key, value)?,

            ["idw", "power"] => self.idw.power = parse_value(key, value)?,
            ["idw", "max_neighbors"] => self.idw.max_neighbors = parse_value(key, value)?,
            ["idw", "min_neighbors"] => self.idw.min_neighbors = parse_value(key, value)?,
            ["idw", "search_radius"] => self.idw.search_radius = parse_value(key, value)?,
            ["idw", "min_points"] => self.idw.min_points = parse_value(key, value)?,

            ["zones", "min_zones"] => self.zones.min_zones = parse_value(key, value)?,
            ["zones", "max_zones"] => self.zones.max_zones = parse_value(key, value)?,
            ["zones", "min_cells_per_zone"] => {
                self.zones.min_cells_per_zone = parse_value(key, value)?
            }
            ["zones", "spatial_weight"] => self.zones.spatial_weight = parse_value(key, value)?,
            ["zones", "seed"] => self.zones.seed = parse_value(key, value)?,
            ["zones", "n_init"] => self.zones.n_init = parse_value(key, value)?,
            ["zones", "max_iter"] => self.zones.max_iter = parse_value(key, value)?,
            ["zones", "tolerance"] => self.zones.tolerance = parse_value(key, value)?,
            ["zones", "tie_tolerance"] => self.zones.tie_tolerance = parse_value(key, value)?,
            ["zones", "silhouette_sample_size"] => {
                self.zones.silhouette_sample_size = parse_value(key, value)?
            }
            ["zones", "strict"] => self.zones.strict = parse_value(key, value)?,

            ["ingest", "min_points"] => self.ingest.min_points = parse_value(key, value)?,
            ["ingest", "value_min"] => self.ingest.value_min = parse_value(key, value)?,
            ["ingest", "value_max"] => self.ingest.value_max = parse_value(key, value)?,
            ["ingest", "clean_outliers"] => self.ingest.clean_outliers = parse_value(key, value)?,
            ["ingest", "iqr_factor"] => self.ingest.iqr_factor = parse_value(key, value)?,
            ["ingest", "lat_column"] => self.ingest.lat_column = value.to_string(),
            ["ingest", "lon_column"] => self.ingest.lon_column = value.to_string(),
            ["ingest", "value_column"] => self.ingest.value_column = value.to_string(),

            ["output", "format"] => self.output.format = value.to_string(),
            ["output", "include_grid"] => self.output.include_grid = parse_value(key, value)?,

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "grid.cell_size",
            "grid.margin",
            "grid.max_cells",
            "idw.power",
            "idw.max_neighbors",
            "idw.min_neighbors",
            "idw.search_radius",
            "idw.min_points",
            "zones.min_zones",
            "zones.max_zones",
            "zones.min_cells_per_zone",
            "zones.spatial_weight",
            "zones.seed",
            "zones.n_init",
            "zones.max_iter",
            "zones.tolerance",
            "zones.tie_tolerance",
            "zones.silhouette_sample_size",
            "zones.strict",
            "ingest.min_points",
            "ingest.value_min",
            "ingest.value_max",
            "ingest.clean_outliers",
            "ingest.iqr_factor",
            "ingest.lat_column",
            "ingest.lon_column",
            "ingest.value_column",
            "output.format",
            "output.include_grid",
        ]
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("Invalid value for {}: {}", key, value)))
}
