//! Climate reanalysis to hourly generation grids.
//!
//! Per location, hourly reanalysis series are turned into simulator-ready
//! resources (wind speed and direction, pressure, temperature, DNI/DHI),
//! handed to external solar and wind simulators, and the resulting AC
//! generation is written into per-year output stores. A second workflow
//! aggregates several years of winds into IEC wind classes, and region
//! masks mark which grid points fall inside a region raster.
//!
//! # Example
//!
//! ```
//! use powgen::derived::direction;
//! use powgen::wind_class::classify_speed;
//!
//! assert_eq!(direction(1.0, 0.0), 270.0);
//! assert_eq!(classify_speed(8.5), 2);
//! ```

pub mod config;
pub mod derived;
pub mod error;
pub mod pipeline;
pub mod region_mask;
pub mod resource_file;
pub mod resume;
pub mod simulate;
pub mod spreadsheet;
pub mod wind_class;

pub use config::{PowGenConfig, RegionConfig, SimulatorCommand};
pub use derived::{derive_bundle, decompose_irradiance, DerivedResourceBundle, SolarDay};
pub use error::{PowGenError, Result};
pub use pipeline::{BatchPolicy, CellOutcome, CellPipeline, ColumnSummary, RunOutcome};
pub use region_mask::{discover_rasters, write_region_mask, RegionMask};
pub use resource_file::ResourceFile;
pub use resume::{FileJobStateStore, JobState, JobStateStore, MemoryJobStateStore};
pub use simulate::{
    CellResources, CommandSimulator, SimulationOutput, Simulator, SystemConfig,
};
pub use wind_class::{
    classify_speed, discover_years, write_classification, ClassificationGrid,
    WindClassAggregator, WindClassSummary,
};
