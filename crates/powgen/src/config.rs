//! Run configuration.
//!
//! ```yaml
//! grid:
//!   num_lats: 37
//!   num_lons: 31
//!   start_lat: 31.5
//!   start_lon: -125.0
//! paths:
//!   dataset: /data/processed/merra_wecc_{year}.nc
//!   destination: /data/output
//!   work_dir: /tmp/powgen
//!   resume_log: /data/output/resume.log
//! simulators:
//!   solar:
//!     program: pvwatts-sim
//!   wind:
//!     program: windpower-sim
//! ```

use std::path::PathBuf;

use grid_store::StoreConfig;
use powgen_common::GridConfig;
use serde::{Deserialize, Serialize};

use crate::error::{PowGenError, Result};
use crate::pipeline::BatchPolicy;
use crate::simulate::SystemConfig;

/// Default scale applied to solar simulator output.
pub const DEFAULT_SOLAR_OUTPUT_SCALE: f64 = 1e-6;

/// Default scale applied to wind simulator output.
pub const DEFAULT_WIND_OUTPUT_SCALE: f64 = 1e-3;

// ============================================================================
// Configuration types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowGenConfig {
    #[serde(default)]
    pub grid: GridConfig,
    pub paths: PathsConfig,
    pub simulators: SimulatorsConfig,
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub batch: BatchPolicy,
    #[serde(default)]
    pub wind_class: WindClassConfig,
    #[serde(default)]
    pub region: RegionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Hourly archive path with a `{year}` placeholder
    pub dataset: String,
    /// Directory receiving the per-year output stores
    pub destination: PathBuf,
    /// Scratch directory for intermediate resource files
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
    pub resume_log: PathBuf,
}

fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("powgen")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorsConfig {
    pub solar: SimulatorCommand,
    pub wind: SimulatorCommand,
}

/// An external simulator program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Multiplier applied to every output value; the kind's default when unset
    #[serde(default)]
    pub output_scale: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindClassConfig {
    /// Archive path with a `{year}` placeholder; `paths.dataset` when unset
    pub dataset: Option<String>,
    /// Directory scanned for archive years when none are given
    pub search_dir: Option<PathBuf>,
    /// File name prefix of archives in `search_dir`
    pub file_prefix: String,
    /// Classification spreadsheet
    pub output: PathBuf,
}

impl Default for WindClassConfig {
    fn default() -> Self {
        Self {
            dataset: None,
            search_dir: None,
            file_prefix: String::new(),
            output: PathBuf::from("wind_class.csv"),
        }
    }
}

/// Region mask inputs: one raster, or a directory of per-state rasters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    pub raster: Option<PathBuf>,
    /// Rasters in this directory are summed into one mask
    pub state_dir: Option<PathBuf>,
    pub output: PathBuf,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            raster: None,
            state_dir: None,
            output: PathBuf::from("region_bounds.csv"),
        }
    }
}

// ============================================================================
// Parsing and validation
// ============================================================================

impl PowGenConfig {
    /// Parse YAML that has already had environment variables expanded.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| PowGenError::Config(format!("cannot parse configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let grid = &self.grid;
        ensure(grid.num_lats > 0, "grid.num_lats must be positive")?;
        ensure(grid.num_lons > 0, "grid.num_lons must be positive")?;
        ensure(grid.hours_per_year > 0, "grid.hours_per_year must be positive")?;
        ensure(
            grid.lat_step.is_finite() && grid.lat_step > 0.0,
            "grid.lat_step must be positive",
        )?;
        ensure(
            grid.lon_step.is_finite() && grid.lon_step > 0.0,
            "grid.lon_step must be positive",
        )?;
        ensure(
            grid.dataset_lon_count() >= grid.num_lons,
            "grid.dataset_num_lons cannot be smaller than grid.num_lons",
        )?;

        ensure(
            self.paths.dataset.contains("{year}"),
            "paths.dataset must contain a {year} placeholder",
        )?;
        if let Some(dataset) = &self.wind_class.dataset {
            ensure(
                dataset.contains("{year}"),
                "wind_class.dataset must contain a {year} placeholder",
            )?;
        }

        for (name, command) in [
            ("solar", &self.simulators.solar),
            ("wind", &self.simulators.wind),
        ] {
            ensure(
                !command.program.trim().is_empty(),
                &format!("simulators.{name}.program cannot be empty"),
            )?;
            if let Some(scale) = command.output_scale {
                ensure(
                    scale.is_finite() && scale > 0.0,
                    &format!("simulators.{name}.output_scale must be positive"),
                )?;
            }
        }

        ensure(
            self.system.capacity_kw.is_finite() && self.system.capacity_kw > 0.0,
            "system.capacity_kw must be positive",
        )?;
        ensure(
            self.system.hub_height_m.is_finite() && self.system.hub_height_m > 0.0,
            "system.hub_height_m must be positive",
        )?;

        ensure(
            self.region.raster.is_none() || self.region.state_dir.is_none(),
            "region.raster and region.state_dir are mutually exclusive",
        )?;

        self.store.validate().map_err(PowGenError::Config)?;
        Ok(())
    }

    pub fn solar_output_scale(&self) -> f64 {
        self.simulators
            .solar
            .output_scale
            .unwrap_or(DEFAULT_SOLAR_OUTPUT_SCALE)
    }

    pub fn wind_output_scale(&self) -> f64 {
        self.simulators
            .wind
            .output_scale
            .unwrap_or(DEFAULT_WIND_OUTPUT_SCALE)
    }

    /// Archive template used for wind classification.
    pub fn wind_class_dataset(&self) -> &str {
        self.wind_class
            .dataset
            .as_deref()
            .unwrap_or(&self.paths.dataset)
    }
}

fn ensure(condition: bool, msg: &str) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(PowGenError::Config(msg.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
paths:
  dataset: /data/merra_wecc_{year}.nc
  destination: /data/out
  resume_log: /data/out/resume.log
simulators:
  solar:
    program: pvwatts-sim
  wind:
    program: windpower-sim
    args: ["--turbine", "default"]
"#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = PowGenConfig::from_yaml_str(MINIMAL).unwrap();

        assert_eq!(config.grid, GridConfig::default());
        assert_eq!(config.grid.hours_per_year, 8760);
        assert_eq!(config.system, SystemConfig::default());
        assert!(config.batch.continue_on_simulation_failure);
        assert_eq!(config.solar_output_scale(), 1e-6);
        assert_eq!(config.wind_output_scale(), 1e-3);
        assert_eq!(config.simulators.wind.args, vec!["--turbine", "default"]);
        assert_eq!(config.wind_class_dataset(), "/data/merra_wecc_{year}.nc");
        assert_eq!(config.wind_class.output, PathBuf::from("wind_class.csv"));
        assert_eq!(config.region, RegionConfig::default());
    }

    #[test]
    fn test_overrides() {
        let yaml = format!(
            "{MINIMAL}grid:\n  num_lats: 2\n  num_lons: 3\n  dataset_num_lons: 10\nsystem:\n  hub_height_m: 100\nbatch:\n  continue_on_simulation_failure: false\n"
        );
        let config = PowGenConfig::from_yaml_str(&yaml).unwrap();

        assert_eq!(config.grid.num_lats, 2);
        assert_eq!(config.grid.dataset_lon_count(), 10);
        assert_eq!(config.grid.start_lat, 31.5);
        assert_eq!(config.system.hub_height_m, 100.0);
        assert_eq!(config.system.capacity_kw, 1000.0);
        assert!(!config.batch.continue_on_simulation_failure);
    }

    #[test]
    fn test_rejects_missing_year_placeholder() {
        let yaml = MINIMAL.replace("merra_wecc_{year}.nc", "merra.nc");
        let err = PowGenConfig::from_yaml_str(&yaml).unwrap_err();
        assert!(matches!(err, PowGenError::Config(ref m) if m.contains("{year}")));
    }

    #[test]
    fn test_rejects_empty_program() {
        let yaml = MINIMAL.replace("pvwatts-sim", "\"\"");
        let err = PowGenConfig::from_yaml_str(&yaml).unwrap_err();
        assert!(matches!(err, PowGenError::Config(ref m) if m.contains("solar")));
    }

    #[test]
    fn test_rejects_zero_grid() {
        let yaml = format!("{MINIMAL}grid:\n  num_lons: 0\n");
        assert!(PowGenConfig::from_yaml_str(&yaml).is_err());
    }

    #[test]
    fn test_rejects_narrow_dataset() {
        let yaml = format!("{MINIMAL}grid:\n  num_lons: 5\n  dataset_num_lons: 4\n");
        assert!(PowGenConfig::from_yaml_str(&yaml).is_err());
    }

    #[test]
    fn test_region_sources_are_exclusive() {
        let yaml = format!("{MINIMAL}region:\n  state_dir: /data/states\n");
        let config = PowGenConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(config.region.state_dir, Some(PathBuf::from("/data/states")));
        assert_eq!(config.region.output, PathBuf::from("region_bounds.csv"));

        let both = format!("{yaml}  raster: /data/offshore.nc\n");
        let err = PowGenConfig::from_yaml_str(&both).unwrap_err();
        assert!(matches!(err, PowGenError::Config(ref m) if m.contains("region")));
    }

    #[test]
    fn test_rejects_unparseable_yaml() {
        let err = PowGenConfig::from_yaml_str("paths: [").unwrap_err();
        assert!(matches!(err, PowGenError::Config(_)));
    }
}
