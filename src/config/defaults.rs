//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default interpolation grid cell size in meters
pub const DEFAULT_CELL_SIZE: f64 = 10.0;

/// Default margin added around the point extent in meters
pub const DEFAULT_MARGIN: f64 = 0.0;

/// Upper bound on grid cells for one run
pub const DEFAULT_MAX_CELLS: usize = 4_000_000;

/// Default IDW power
pub const DEFAULT_IDW_POWER: f64 = 2.0;

/// Default maximum neighbors per cell estimate
pub const DEFAULT_MAX_NEIGHBORS: usize = 12;

/// Default minimum neighbors for a cell to be defined
pub const DEFAULT_MIN_NEIGHBORS: usize = 1;

/// Default neighbor search radius in meters
pub const DEFAULT_SEARCH_RADIUS: f64 = 100.0;

/// Default floor on input points for interpolation
pub const DEFAULT_MIN_POINTS: usize = 3;

/// Default smallest candidate zone count
pub const DEFAULT_MIN_ZONES: usize = 2;

/// Default largest candidate zone count
pub const DEFAULT_MAX_ZONES: usize = 7;

/// Default minimum cells per zone
pub const DEFAULT_MIN_CELLS_PER_ZONE: usize = 1;

/// Default weight of planar coordinates against value (0 = value only)
pub const DEFAULT_SPATIAL_WEIGHT: f64 = 0.0;

/// Default clustering seed
pub const DEFAULT_SEED: u64 = 42;

/// Default k-means restarts per candidate
pub const DEFAULT_N_INIT: usize = 10;

/// Default k-means iteration budget per restart
pub const DEFAULT_MAX_ITER: usize = 300;

/// Default k-means convergence tolerance (centroid shift, standardized units)
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Default silhouette tie tolerance
pub const DEFAULT_TIE_TOLERANCE: f64 = 1e-9;

/// Default number of cells scored by the silhouette metric
pub const DEFAULT_SILHOUETTE_SAMPLE_SIZE: usize = 3_000;

/// Default minimum points for ingest validation
pub const DEFAULT_INGEST_MIN_POINTS: usize = 100;

/// Default plausible yield range (t/ha)
pub const DEFAULT_VALUE_MIN: f64 = 0.0;
pub const DEFAULT_VALUE_MAX: f64 = 200.0;

/// Default IQR multiplier for outlier cleaning
pub const DEFAULT_IQR_FACTOR: f64 = 3.0;

/// Default CSV column names
pub const DEFAULT_LAT_COLUMN: &str = "latitude";
pub const DEFAULT_LON_COLUMN: &str = "longitude";
pub const DEFAULT_VALUE_COLUMN: &str = "yield";

/// Default output format
pub const DEFAULT_FORMAT: &str = "text";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "yield-zones";
