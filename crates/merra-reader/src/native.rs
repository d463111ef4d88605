//! Native archive reading using the netcdf library.
//!
//! Each channel variable is laid out with the flattened location axis first,
//! followed by one or two time axes (`[location, time]` or
//! `[location, record, sub_step]`). One location is read as a hyperslab and
//! flattened in chronological order.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::channel::Channel;
use crate::dataset::ResourceDataset;
use crate::error::{ReaderError, ReaderResult};
use crate::region::RegionRaster;
use crate::source::{year_path, DatasetSource};

/// An open reanalysis archive.
pub struct NetCdfDataset {
    path: PathBuf,
    file: netcdf::File,
    num_locations: usize,
}

impl NetCdfDataset {
    /// Open an archive and determine its spatial extent from the first
    /// available channel.
    pub fn open(path: impl AsRef<Path>) -> ReaderResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ReaderError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("archive not found: {}", path.display()),
            )));
        }

        let file = netcdf::open(path).map_err(|e| {
            ReaderError::invalid_format(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let num_locations = Channel::ALL
            .iter()
            .find_map(|c| file.variable(c.variable_name()))
            .and_then(|v| v.dimensions().first().map(|d| d.len()))
            .ok_or_else(|| {
                ReaderError::invalid_format(format!(
                    "{} has no recognised channel variables",
                    path.display()
                ))
            })?;

        info!(path = %path.display(), locations = num_locations, "Opened archive");

        Ok(Self {
            path: path.to_path_buf(),
            file,
            num_locations,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResourceDataset for NetCdfDataset {
    fn num_locations(&self) -> usize {
        self.num_locations
    }

    fn has_channel(&self, channel: Channel) -> bool {
        self.file.variable(channel.variable_name()).is_some()
    }

    fn read_location(&self, channel: Channel, index: usize) -> ReaderResult<Vec<f64>> {
        let name = channel.variable_name();
        let var = self
            .file
            .variable(name)
            .ok_or_else(|| ReaderError::MissingVariable(name.to_string()))?;

        let limit = var.dimensions().first().map(|d| d.len()).unwrap_or(0);
        if index >= limit {
            return Err(ReaderError::IndexOutOfRange { index, limit });
        }

        let values: Vec<f32> = match var.dimensions().len() {
            2 => var.get_values((index, ..)),
            3 => var.get_values((index, .., ..)),
            rank => {
                return Err(ReaderError::invalid_format(format!(
                    "{} has rank {}, expected 2 or 3",
                    name, rank
                )))
            }
        }
        .map_err(|e| ReaderError::invalid_format(format!("Failed to read {}: {}", name, e)))?;

        debug!(channel = name, index = index, samples = values.len(), "Read location");
        Ok(values.into_iter().map(f64::from).collect())
    }
}

/// Opens `{year}`-templated archive paths from disk.
#[derive(Debug, Clone)]
pub struct NetCdfDatasetSource {
    template: String,
}

impl NetCdfDatasetSource {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl DatasetSource for NetCdfDatasetSource {
    fn open_year(&self, year: i32) -> ReaderResult<Arc<dyn ResourceDataset>> {
        let dataset = NetCdfDataset::open(year_path(&self.template, year))?;
        Ok(Arc::new(dataset))
    }
}

// ============================================================================
// Region rasters
// ============================================================================

const RASTER_BAND: &str = "Band1";

/// Read a region raster holding `lat`, `lon` and a 2-D `Band1` over them.
/// Points equal to the band's fill value count as outside the region.
pub fn read_region_raster(path: impl AsRef<Path>) -> ReaderResult<RegionRaster> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ReaderError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("region raster not found: {}", path.display()),
        )));
    }
    let file = netcdf::open(path).map_err(|e| {
        ReaderError::invalid_format(format!("Failed to open {}: {}", path.display(), e))
    })?;

    let lats = read_axis(&file, "lat")?;
    let lons = read_axis(&file, "lon")?;

    let band = file
        .variable(RASTER_BAND)
        .ok_or_else(|| ReaderError::MissingVariable(RASTER_BAND.to_string()))?;
    let dims: Vec<String> = band.dimensions().iter().map(|d| d.name()).collect();
    if dims.len() != 2 {
        return Err(ReaderError::invalid_format(format!(
            "{} has rank {}, expected 2",
            RASTER_BAND,
            dims.len()
        )));
    }
    let fill = get_f64_attr(&band, "_FillValue");
    let mut values: Vec<f64> = band
        .get_values(..)
        .map_err(|e| ReaderError::invalid_format(format!("Failed to read {}: {}", RASTER_BAND, e)))?;
    if let Some(fill) = fill {
        for v in values.iter_mut().filter(|v| **v == fill) {
            *v = f64::NAN;
        }
    }

    if values.len() != lats.len() * lons.len() {
        return Err(ReaderError::invalid_format(format!(
            "{} holds {} values for {} lats and {} lons",
            RASTER_BAND,
            values.len(),
            lats.len(),
            lons.len()
        )));
    }

    // Stored as (lon, lat): transpose to latitude-major
    if dims[0] == "lon" {
        let mut transposed = vec![0.0; values.len()];
        for (idx, v) in values.iter().enumerate() {
            let (lon_idx, lat_idx) = (idx / lats.len(), idx % lats.len());
            transposed[lat_idx * lons.len() + lon_idx] = *v;
        }
        values = transposed;
    }

    info!(
        path = %path.display(),
        lats = lats.len(),
        lons = lons.len(),
        "Read region raster"
    );
    RegionRaster::new(lats, lons, values)
}

fn read_axis(file: &netcdf::File, name: &str) -> ReaderResult<Vec<f64>> {
    let var = file
        .variable(name)
        .ok_or_else(|| ReaderError::MissingVariable(name.to_string()))?;
    var.get_values(..)
        .map_err(|e| ReaderError::invalid_format(format!("Failed to read {}: {}", name, e)))
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking optional attributes.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}
