//! Reader for MERRA-style hourly reanalysis archives.
//!
//! The archive keeps every grid location on one flattened spatial axis; this
//! crate reads the channels for a single location and hands them back as
//! chronological `f64` series.
//!
//! # Backends
//!
//! - [`MemoryDataset`]: in-memory archive, used by tests and small tools.
//! - `NetCdfDataset`: native reading through libnetcdf, behind the `netcdf`
//!   cargo feature (requires libhdf5-dev and libnetcdf-dev).
//!
//! Region rasters ([`RegionRaster`]) mark which grid points fall inside a
//! region; `read_region_raster` loads them under the same feature.

pub mod bundle;
pub mod channel;
pub mod dataset;
pub mod error;
#[cfg(feature = "netcdf")]
pub mod native;
pub mod region;
pub mod source;

pub use bundle::{extract_raw_bundle, extract_wind_pair, RawResourceBundle, WindPair};
pub use channel::Channel;
pub use dataset::{MemoryDataset, ResourceDataset};
pub use error::{ReaderError, ReaderResult};
#[cfg(feature = "netcdf")]
pub use native::{read_region_raster, NetCdfDataset, NetCdfDatasetSource};
pub use region::{nearest_index, RegionRaster};
pub use source::{year_path, DatasetSource, MemoryDatasetSource};
