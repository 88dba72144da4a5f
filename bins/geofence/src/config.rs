//! Configuration file loading
//!
//! Values are read from TOML; every field has a default so an empty or
//! missing file yields the stock Dublin / 100 km setup.

use anyhow::Context;
use geofence_geo::{Coordinate, DEFAULT_MAX_ITERATIONS};
use geofence_telemetry::TelemetryConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    #[serde(default)]
    pub reference: ReferenceConfig,

    #[serde(default)]
    pub filter: FilterConfig,

    #[serde(default)]
    pub distance: DistanceConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub logging: TelemetryConfig,
}

/// Point that records are measured against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceConfig {
    #[serde(default = "default_reference_name")]
    pub name: String,

    #[serde(default = "default_reference_latitude")]
    pub latitude: f64,

    #[serde(default = "default_reference_longitude")]
    pub longitude: f64,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            name: default_reference_name(),
            latitude: default_reference_latitude(),
            longitude: default_reference_longitude(),
        }
    }
}

impl ReferenceConfig {
    /// Validate into a coordinate
    pub fn to_coordinate(&self) -> geofence_geo::Result<Coordinate> {
        Coordinate::new(self.name.clone(), self.latitude, self.longitude)
    }
}

fn default_reference_name() -> String {
    "Dublin".to_string()
}

fn default_reference_latitude() -> f64 {
    53.339428
}

fn default_reference_longitude() -> f64 {
    -6.257664
}

/// Radius filtering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Records farther than this many kilometers are dropped
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            radius_km: default_radius_km(),
        }
    }
}

fn default_radius_km() -> f64 {
    100.0
}

/// Defaults for the `distance` command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceConfig {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: i32,
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
        }
    }
}

fn default_max_iterations() -> i32 {
    DEFAULT_MAX_ITERATIONS
}

/// Input and output files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_input")]
    pub input: PathBuf,

    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
        }
    }
}

fn default_input() -> PathBuf {
    PathBuf::from("data/customers.txt")
}

fn default_output() -> PathBuf {
    PathBuf::from("data/output.txt")
}

/// Configuration wrapper
#[derive(Debug, Clone)]
pub struct Config {
    pub schema: ConfigSchema,
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file path or use defaults
    ///
    /// An explicit path must exist. Without one, the standard locations are
    /// searched and defaults are used if none is present.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = path.map(Path::to_path_buf).or_else(find_config_file);

        let schema = match config_path {
            Some(ref p) => load_config_file(p)?,
            None => ConfigSchema::default(),
        };

        if let Some(ref p) = config_path {
            tracing::debug!(path = %p.display(), "Loaded configuration");
        }

        Ok(Self {
            schema,
            path: config_path,
        })
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<PathBuf> {
    let candidates = [".geofence.toml", "geofence.toml", ".config/geofence.toml"];

    candidates
        .into_iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> anyhow::Result<ConfigSchema> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}
