//! Configuration management for robinson-map.
//!
//! This module handles the layered configuration system with the following precedence:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. JSON config file
//! 4. Default values (lowest priority)

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{MapError, Result};
use crate::graticule::shift::{BASE_LONGITUDES, BASE_SHIFTS};
use crate::graticule::{graticule_labels, meridian_offsets, GraticuleSpec, ShiftTable};
use crate::projection::{get_projector, DEFAULT_PROJECTION};
use crate::render::Style;

/// Largest raster side we are willing to allocate, in pixels
const MAX_PIXELS_PER_SIDE: u32 = 20_000;

/// Command-line arguments for robinson-map
#[derive(Parser, Debug, Default)]
#[command(name = "robinson-map")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// CSV file with one study site per row
    pub sites: Option<PathBuf>,

    /// GeoJSON file with country outlines
    #[arg(short, long, env = "ROBINSON_MAP_BASEMAP")]
    pub basemap: Option<PathBuf>,

    /// Directory the map files are written to
    #[arg(short, long, env = "ROBINSON_MAP_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Projection string, e.g. "+proj=robin +lon_0=0"
    #[arg(short, long, env = "ROBINSON_MAP_PROJECTION")]
    pub projection: Option<String>,

    /// Output formats to write
    #[arg(short, long, value_enum, value_delimiter = ',', env = "ROBINSON_MAP_FORMATS")]
    pub formats: Option<Vec<OutputFormat>>,

    /// Figure width in inches
    #[arg(long, env = "ROBINSON_MAP_WIDTH")]
    pub width: Option<f64>,

    /// Figure height in inches
    #[arg(long, env = "ROBINSON_MAP_HEIGHT")]
    pub height: Option<f64>,

    /// Raster resolution in dots per inch
    #[arg(long, env = "ROBINSON_MAP_DPI")]
    pub dpi: Option<u32>,

    /// Also write the projected sites and labels as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to JSON configuration file
    #[arg(short, long, env = "ROBINSON_MAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "ROBINSON_MAP_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Output file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Svg,
    Png,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
        }
    }
}

/// Input data configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// CSV file with the study sites
    pub sites_path: Option<PathBuf>,
    /// GeoJSON file with country outlines
    pub basemap_path: Option<PathBuf>,
    /// Column holding the site identifier
    pub id_column: String,
    /// Column holding the longitude
    pub lon_column: String,
    /// Column holding the latitude
    pub lat_column: String,
}

/// Projection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// PROJ-style projection string
    pub spec: String,
    /// Longitude component of the label nudge, in degrees
    pub nudge_lon: f64,
    /// Latitude component of the label nudge, in degrees
    pub nudge_lat: f64,
}

/// Graticule configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraticuleConfig {
    /// Meridian spacing in degrees
    pub lon_step: f64,
    /// Parallel spacing in degrees
    pub lat_step: f64,
    /// Sampling interval along graticule lines in degrees
    pub resolution: f64,
    /// Eastern-hemisphere meridians of the label shift table
    pub shift_longitudes: Vec<i32>,
    /// Label shift in degrees for each entry of `shift_longitudes`
    pub shift_degrees: Vec<f64>,
}

impl GraticuleConfig {
    pub fn spec(&self) -> GraticuleSpec {
        GraticuleSpec {
            lon_step: self.lon_step,
            lat_step: self.lat_step,
            resolution: self.resolution,
            ..GraticuleSpec::default()
        }
    }

    pub fn shift_table(&self) -> Result<ShiftTable> {
        ShiftTable::from_base(&self.shift_longitudes, &self.shift_degrees)
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the files are written to
    pub dir: PathBuf,
    /// File name without extension
    pub basename: String,
    /// Formats to write
    pub formats: Vec<OutputFormat>,
    /// Figure width in inches
    pub width_in: f64,
    /// Figure height in inches
    pub height_in: f64,
    /// Raster resolution in dots per inch
    pub dpi: u32,
    /// Write projected sites and labels as JSON next to the map
    pub write_json: bool,
}

impl OutputConfig {
    /// Raster size in pixels
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width_in * self.dpi as f64).round() as u32,
            (self.height_in * self.dpi as f64).round() as u32,
        )
    }

    /// Full path for a given format
    pub fn path_for(&self, format: OutputFormat) -> PathBuf {
        self.dir
            .join(format!("{}.{}", self.basename, format.extension()))
    }

    pub fn json_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.basename))
    }
}

/// Complete configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub projection: ProjectionConfig,
    pub graticule: GraticuleConfig,
    pub output: OutputConfig,
    pub style: Style,
    /// Log level
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Build configuration from parsed arguments
    pub fn from_args(args: Args) -> Result<Self> {
        // Start with defaults, or the JSON file if provided
        let mut config = match &args.config {
            Some(path) => Self::load_from_file(path)?,
            None => Config::default(),
        };

        config.apply_args(args);
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Override with command-line arguments
    fn apply_args(&mut self, args: Args) {
        if args.sites.is_some() {
            self.input.sites_path = args.sites;
        }
        if args.basemap.is_some() {
            self.input.basemap_path = args.basemap;
        }
        if let Some(dir) = args.output_dir {
            self.output.dir = dir;
        }
        if let Some(spec) = args.projection {
            self.projection.spec = spec;
        }
        if let Some(formats) = args.formats {
            self.output.formats = formats;
        }
        if let Some(width) = args.width {
            self.output.width_in = width;
        }
        if let Some(height) = args.height {
            self.output.height_in = height;
        }
        if let Some(dpi) = args.dpi {
            self.output.dpi = dpi;
        }
        if args.json {
            self.output.write_json = true;
        }
        if let Some(level) = args.log_level {
            self.log_level = level;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        // Validate log level
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(MapError::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        if self.input.sites_path.is_none() {
            return Err(MapError::Config {
                message: "No sites file given".to_string(),
            });
        }

        let columns = [
            &self.input.id_column,
            &self.input.lon_column,
            &self.input.lat_column,
        ];
        if columns.iter().any(|c| c.trim().is_empty()) {
            return Err(MapError::Config {
                message: "Column names cannot be empty".to_string(),
            });
        }
        if self.input.lon_column == self.input.lat_column {
            return Err(MapError::Config {
                message: format!(
                    "Longitude and latitude columns must differ, both are '{}'",
                    self.input.lon_column
                ),
            });
        }

        // The projection must resolve before anything is read
        let projector = get_projector(&self.projection.spec).map_err(|e| MapError::Config {
            message: format!("Invalid projection: {}", e),
        })?;

        if !(self.projection.nudge_lon.is_finite() && self.projection.nudge_lat.is_finite()) {
            return Err(MapError::Config {
                message: "Label nudge must be finite".to_string(),
            });
        }

        // Every meridian label needs a shift entry for its distance from lon_0
        let lon_0 = projector.central_meridian();
        let spec = self.graticule.spec().centred_on(lon_0);
        spec.validate()?;
        let table = self.graticule.shift_table()?;
        table.validate_covers(&meridian_offsets(&graticule_labels(&spec), lon_0))?;

        self.style.validate()?;
        self.validate_output()
    }

    fn validate_output(&self) -> Result<()> {
        let output = &self.output;

        if output.formats.is_empty() {
            return Err(MapError::Config {
                message: "At least one output format is required".to_string(),
            });
        }

        if output.basename.is_empty() || output.basename.contains(['/', '\\']) {
            return Err(MapError::Config {
                message: format!("Invalid output basename: '{}'", output.basename),
            });
        }

        for (name, value) in [("width", output.width_in), ("height", output.height_in)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(MapError::InvalidParameter {
                    param: name.to_string(),
                    message: format!("must be a positive number of inches, got {}", value),
                });
            }
        }

        if output.dpi == 0 {
            return Err(MapError::InvalidParameter {
                param: "dpi".to_string(),
                message: "must be positive".to_string(),
            });
        }

        let (w, h) = output.pixel_size();
        if w == 0 || h == 0 || w > MAX_PIXELS_PER_SIDE || h > MAX_PIXELS_PER_SIDE {
            return Err(MapError::InvalidParameter {
                param: "dpi".to_string(),
                message: format!(
                    "raster size {}x{} must be between 1 and {} pixels per side",
                    w, h, MAX_PIXELS_PER_SIDE
                ),
            });
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            projection: ProjectionConfig::default(),
            graticule: GraticuleConfig::default(),
            output: OutputConfig::default(),
            style: Style::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            sites_path: None,
            basemap_path: None,
            id_column: "id".to_string(),
            lon_column: "longitude".to_string(),
            lat_column: "latitude".to_string(),
        }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            spec: DEFAULT_PROJECTION.to_string(),
            nudge_lon: 10.0,
            nudge_lat: 4.0,
        }
    }
}

impl Default for GraticuleConfig {
    fn default() -> Self {
        let spec = GraticuleSpec::default();
        Self {
            lon_step: spec.lon_step,
            lat_step: spec.lat_step,
            resolution: spec.resolution,
            shift_longitudes: BASE_LONGITUDES.to_vec(),
            shift_degrees: BASE_SHIFTS.to_vec(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            basename: "map".to_string(),
            formats: vec![OutputFormat::Svg, OutputFormat::Png],
            width_in: 11.0,
            height_in: 6.0,
            dpi: 300,
            write_json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
