//! Analyze command handler
//!
//! Reads a harvest file, clips it to an optional field boundary, cleans it
//! and runs the zone analysis.

use crate::analysis::analyze;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::{available_formats, get_formatter, AnalysisReport, InputSummary};
use crate::ingest::{
    available_readers, clean_outliers, clip_to_boundary, reader_for_path, validate, Boundary,
};
use clap::Args;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Analyze command arguments
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Harvest file (.csv, .geojson or .json)
    #[arg(required_unless_present_any = ["list_formats", "list_readers"])]
    pub input: Option<PathBuf>,

    /// Field boundary (GeoJSON Polygon or MultiPolygon); points outside are dropped
    #[arg(long, short = 'b')]
    pub boundary: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f')]
    pub format: Option<String>,

    /// Write output to file
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Grid cell size in meters
    #[arg(long, short = 'c')]
    pub cell_size: Option<f64>,

    /// IDW distance power
    #[arg(long, short = 'p')]
    pub power: Option<f64>,

    /// Maximum neighbors per cell estimate
    #[arg(long)]
    pub max_neighbors: Option<usize>,

    /// Minimum neighbors for a cell to be defined
    #[arg(long)]
    pub min_neighbors: Option<usize>,

    /// Neighbor search radius in meters
    #[arg(long, short = 'r')]
    pub search_radius: Option<f64>,

    /// Fixed number of zones (sets both --min-zones and --max-zones)
    #[arg(long, short = 'z', conflicts_with_all = ["min_zones", "max_zones"])]
    pub zones: Option<usize>,

    /// Smallest candidate zone count
    #[arg(long)]
    pub min_zones: Option<usize>,

    /// Largest candidate zone count
    #[arg(long)]
    pub max_zones: Option<usize>,

    /// Weight of cell position against value when clustering
    #[arg(long)]
    pub spatial_weight: Option<f64>,

    /// Clustering seed
    #[arg(long, short = 's')]
    pub seed: Option<u64>,

    /// Fail instead of falling back when the zone range is infeasible
    #[arg(long)]
    pub strict: bool,

    /// Keep IQR outliers
    #[arg(long)]
    pub no_clean: bool,

    /// Skip input validation
    #[arg(long)]
    pub no_validate: bool,

    /// Include the interpolated grid in JSON output
    #[arg(long)]
    pub include_grid: bool,

    /// Debug logging
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// List available formats
    #[arg(short = 'F', long = "list-formats")]
    pub list_formats: bool,

    /// List available input readers
    #[arg(long = "list-readers")]
    pub list_readers: bool,
}

impl AnalyzeArgs {
    /// Overlay command-line overrides on the loaded config
    fn apply(&self, config: &mut Config) {
        if let Some(v) = self.cell_size {
            config.grid.cell_size = v;
        }
        if let Some(v) = self.power {
            config.idw.power = v;
        }
        if let Some(v) = self.max_neighbors {
            config.idw.max_neighbors = v;
        }
        if let Some(v) = self.min_neighbors {
            config.idw.min_neighbors = v;
        }
        if let Some(v) = self.search_radius {
            config.idw.search_radius = v;
        }
        if let Some(n) = self.zones {
            config.zones.min_zones = n;
            config.zones.max_zones = n;
        }
        if let Some(v) = self.min_zones {
            config.zones.min_zones = v;
        }
        if let Some(v) = self.max_zones {
            config.zones.max_zones = v;
        }
        if let Some(v) = self.spatial_weight {
            config.zones.spatial_weight = v;
        }
        if let Some(v) = self.seed {
            config.zones.seed = v;
        }
        if self.strict {
            config.zones.strict = true;
        }
        if self.no_clean {
            config.ingest.clean_outliers = false;
        }
        if self.include_grid {
            config.output.include_grid = true;
        }
        if let Some(format) = &self.format {
            config.output.format = format.clone();
        }
    }
}

/// Run the analyze command
pub fn run(args: AnalyzeArgs) -> Result<()> {
    if args.list_formats {
        list_formats();
        return Ok(());
    }
    if args.list_readers {
        list_readers();
        return Ok(());
    }

    init_logging(args.verbose);

    let input = args
        .input
        .clone()
        .ok_or_else(|| Error::Ingest("No input file given".to_string()))?;

    let mut config = Config::load()?;
    args.apply(&mut config);
    config.validate()?;

    // Resolve the formatter before doing any work
    let formatter = get_formatter(&config.output.format).ok_or_else(|| {
        Error::Config(format!("Unknown format: {}", config.output.format))
    })?;

    let reader = reader_for_path(&input, &config.ingest)?;
    let set = reader.read(&input)?;
    let loaded = set.samples.len();

    let samples = match &args.boundary {
        Some(path) => clip_to_boundary(&set.samples, &Boundary::read(path)?),
        None => set.samples,
    };
    let outside_boundary = loaded - samples.len();

    let validation = if args.no_validate {
        None
    } else {
        let report = validate(&samples, set.missing, &config.ingest);
        for warning in &report.warnings {
            tracing::warn!("{}", warning);
        }
        if !report.valid {
            return Err(Error::Ingest(format!(
                "Validation failed: {}",
                report.errors.join("; ")
            )));
        }
        Some(report)
    };

    let clipped = samples.len();
    let samples = if config.ingest.clean_outliers {
        clean_outliers(&samples, config.ingest.iqr_factor)
    } else {
        samples
    };

    info!(
        points = samples.len(),
        cell_size = config.grid.cell_size,
        min_zones = config.zones.min_zones,
        max_zones = config.zones.max_zones,
        "Starting analysis"
    );
    let result = analyze(&samples, &config.analysis())?;

    let report = AnalysisReport::new(
        input.display().to_string(),
        InputSummary {
            loaded,
            missing_values: set.missing,
            outside_boundary,
            removed_outliers: clipped - samples.len(),
            analyzed: samples.len(),
            validation,
        },
        result,
    );
    let output = formatter.format(&report, &config)?;

    // Write output
    if let Some(path) = args.output {
        std::fs::write(&path, &output)?;
        eprintln!("Output written to {}", path.display());
    } else {
        println!("{}", output);
    }

    Ok(())
}

/// Install the stderr subscriber; RUST_LOG wins over --verbose
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Print available input readers
fn list_readers() {
    println!("Available input readers:");
    for reader in available_readers() {
        println!("  {:8} - .{}", reader.name, reader.extensions.join(", ."));
    }
}

/// Print available output formats
fn list_formats() {
    println!("Available output formats:");
    for format in available_formats() {
        println!("  {:8} - {}", format.name, format.description);
    }
}
