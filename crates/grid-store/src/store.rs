//! Zarr V3 generation stores.
//!
//! One store per year and energy kind lives at
//! `<destination>/<year>_<kind>_ac_generation.zarr`. Each store is a group
//! holding four arrays:
//!
//! - `ac`: float64 `[lat, lon, hour]`, NaN placeholders, one chunk per cell
//! - `written`: uint8 `[lat, lon]`, set to 1 once a cell's series is stored
//! - `lat`, `lon`: float64 coordinate side-arrays
//!
//! Whether a cell is written is read from `written`, never inferred from
//! the `ac` values: a simulator may legitimately produce NaN hours.
//!
//! The group metadata is written last, so its presence marks a complete
//! store. Writers must own disjoint cells: nothing here arbitrates two
//! processes writing the same cell at the same time.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use powgen_common::EnergyKind;
use tracing::{debug, info};
use zarrs::array::codec::bytes_to_bytes::blosc::{
    BloscCodec, BloscCompressionLevel, BloscCompressor, BloscShuffleMode,
};
use zarrs::array::{Array, ArrayBuilder, DataType, FillValue};
use zarrs::array_subset::ArraySubset;
use zarrs::group::GroupBuilder;
use zarrs_filesystem::FilesystemStore;

use crate::config::{StoreConfig, ZarrCompression};
use crate::error::{Result, StoreError};

const AC_ARRAY: &str = "/ac";
const WRITTEN_ARRAY: &str = "/written";
const LAT_ARRAY: &str = "/lat";
const LON_ARRAY: &str = "/lon";
const GROUP_METADATA: &str = "zarr.json";

/// Path of the store for one year and energy kind.
pub fn store_path(destination: &Path, year: i32, kind: EnergyKind) -> PathBuf {
    destination.join(format!("{}_{}_ac_generation.zarr", year, kind))
}

/// Whether a complete store exists at `path`.
pub fn store_exists(path: &Path) -> bool {
    path.join(GROUP_METADATA).is_file()
}

/// Create the solar and wind stores for `year` when absent.
pub fn ensure_grid_store(
    year: i32,
    lats: &[f64],
    lons: &[f64],
    hours: usize,
    destination: &Path,
    config: &StoreConfig,
) -> Result<OutputGridStore> {
    OutputGridStore::ensure(destination, year, lats, lons, hours, config)
}

/// Handle on the pair of stores for one year.
#[derive(Debug, Clone)]
pub struct OutputGridStore {
    destination: PathBuf,
    year: i32,
    num_lats: usize,
    num_lons: usize,
    hours: usize,
}

impl OutputGridStore {
    /// Create any missing store for `year`. Existing stores are never
    /// re-created or truncated, but their shape must match.
    pub fn ensure(
        destination: &Path,
        year: i32,
        lats: &[f64],
        lons: &[f64],
        hours: usize,
        config: &StoreConfig,
    ) -> Result<Self> {
        if lats.is_empty() || lons.is_empty() || hours == 0 {
            return Err(StoreError::invalid_dimension(format!(
                "store shape must be non-empty, got [{}, {}, {}]",
                lats.len(),
                lons.len(),
                hours
            )));
        }
        config.validate().map_err(StoreError::Config)?;

        let expected = [lats.len() as u64, lons.len() as u64, hours as u64];
        for kind in EnergyKind::ALL {
            let path = store_path(destination, year, kind);
            if store_exists(&path) {
                let shape = open_ac_array(&path)?.shape().to_vec();
                if shape != expected {
                    return Err(StoreError::invalid_dimension(format!(
                        "existing store {} has shape {:?}, expected {:?}",
                        path.display(),
                        shape,
                        expected
                    )));
                }
                debug!(path = %path.display(), "Output store already exists");
            } else {
                create_store(&path, year, kind, lats, lons, hours, config)?;
                info!(
                    path = %path.display(),
                    year = year,
                    kind = %kind,
                    lats = lats.len(),
                    lons = lons.len(),
                    hours = hours,
                    "Created output store"
                );
            }
        }

        Ok(Self {
            destination: destination.to_path_buf(),
            year,
            num_lats: lats.len(),
            num_lons: lons.len(),
            hours,
        })
    }

    /// Open existing stores for `year`, reading the shape from the solar store.
    pub fn open(destination: &Path, year: i32) -> Result<Self> {
        let path = store_path(destination, year, EnergyKind::Solar);
        if !store_exists(&path) {
            return Err(StoreError::NotFound(path.display().to_string()));
        }
        let array = open_ac_array(&path)?;
        let shape = array.shape();
        if shape.len() != 3 {
            return Err(StoreError::invalid_dimension(format!(
                "ac array has {} dimensions, expected 3",
                shape.len()
            )));
        }

        Ok(Self {
            destination: destination.to_path_buf(),
            year,
            num_lats: shape[0] as usize,
            num_lons: shape[1] as usize,
            hours: shape[2] as usize,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// `(num_lats, num_lons, hours)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.num_lats, self.num_lons, self.hours)
    }

    pub fn path(&self, kind: EnergyKind) -> PathBuf {
        store_path(&self.destination, self.year, kind)
    }

    /// Write a full hourly series into one cell.
    ///
    /// Fails with `OutputStoreWriteConflict` if the cell is already marked
    /// written. The marker is set after the series is stored. The caller must
    /// hold exclusive access to the cell for the duration.
    pub fn write_cell(
        &self,
        kind: EnergyKind,
        lat_idx: usize,
        lon_idx: usize,
        series: &[f64],
    ) -> Result<()> {
        self.check_cell(lat_idx, lon_idx)?;
        if series.len() != self.hours {
            return Err(StoreError::invalid_dimension(format!(
                "series has {} values, store expects {}",
                series.len(),
                self.hours
            )));
        }

        let path = self.path(kind);
        let marker = open_array(&path, WRITTEN_ARRAY)?;
        let marker_subset = marker_subset(lat_idx, lon_idx)?;
        if read_marker(&marker, &marker_subset)? {
            return Err(StoreError::OutputStoreWriteConflict {
                kind,
                lat_idx,
                lon_idx,
            });
        }

        let array = open_ac_array(&path)?;
        let subset = self.cell_subset(lat_idx, lon_idx)?;
        array
            .store_array_subset_elements(&subset, series)
            .map_err(|e| StoreError::zarr(e.to_string()))?;
        marker
            .store_array_subset_elements::<u8>(&marker_subset, &[1])
            .map_err(|e| StoreError::zarr(e.to_string()))?;

        debug!(kind = %kind, lat_idx = lat_idx, lon_idx = lon_idx, "Wrote cell");
        Ok(())
    }

    /// Read one cell's hourly series. Unwritten hours are NaN.
    pub fn read_cell(&self, kind: EnergyKind, lat_idx: usize, lon_idx: usize) -> Result<Vec<f64>> {
        self.check_cell(lat_idx, lon_idx)?;
        let array = open_ac_array(&self.path(kind))?;
        let subset = self.cell_subset(lat_idx, lon_idx)?;
        array
            .retrieve_array_subset_elements(&subset)
            .map_err(|e| StoreError::zarr(e.to_string()))
    }

    /// Whether the cell's series has been stored.
    pub fn is_cell_written(&self, kind: EnergyKind, lat_idx: usize, lon_idx: usize) -> Result<bool> {
        self.check_cell(lat_idx, lon_idx)?;
        let marker = open_array(&self.path(kind), WRITTEN_ARRAY)?;
        read_marker(&marker, &marker_subset(lat_idx, lon_idx)?)
    }

    /// Latitude and longitude side-arrays.
    pub fn coordinates(&self, kind: EnergyKind) -> Result<(Vec<f64>, Vec<f64>)> {
        let store = open_store(&self.path(kind))?;
        let lats = read_coordinate(&store, LAT_ARRAY)?;
        let lons = read_coordinate(&store, LON_ARRAY)?;
        Ok((lats, lons))
    }

    fn check_cell(&self, lat_idx: usize, lon_idx: usize) -> Result<()> {
        if lat_idx >= self.num_lats || lon_idx >= self.num_lons {
            return Err(StoreError::invalid_dimension(format!(
                "cell ({}, {}) outside store of {} x {}",
                lat_idx, lon_idx, self.num_lats, self.num_lons
            )));
        }
        Ok(())
    }

    fn cell_subset(&self, lat_idx: usize, lon_idx: usize) -> Result<ArraySubset> {
        ArraySubset::new_with_start_shape(
            vec![lat_idx as u64, lon_idx as u64, 0],
            vec![1, 1, self.hours as u64],
        )
        .map_err(|e| StoreError::zarr(e.to_string()))
    }
}

// ============================================================================
// Store construction
// ============================================================================

fn open_store(path: &Path) -> Result<Arc<FilesystemStore>> {
    if !store_exists(path) {
        return Err(StoreError::NotFound(path.display().to_string()));
    }
    let store = FilesystemStore::new(path).map_err(|e| StoreError::storage(e.to_string()))?;
    Ok(Arc::new(store))
}

fn open_array(path: &Path, array: &str) -> Result<Array<FilesystemStore>> {
    let store = open_store(path)?;
    Array::open(store, array).map_err(|e| StoreError::zarr(e.to_string()))
}

fn open_ac_array(path: &Path) -> Result<Array<FilesystemStore>> {
    open_array(path, AC_ARRAY)
}

fn marker_subset(lat_idx: usize, lon_idx: usize) -> Result<ArraySubset> {
    ArraySubset::new_with_start_shape(vec![lat_idx as u64, lon_idx as u64], vec![1, 1])
        .map_err(|e| StoreError::zarr(e.to_string()))
}

fn read_marker(marker: &Array<FilesystemStore>, subset: &ArraySubset) -> Result<bool> {
    let flags: Vec<u8> = marker
        .retrieve_array_subset_elements(subset)
        .map_err(|e| StoreError::zarr(e.to_string()))?;
    Ok(flags.iter().any(|&f| f != 0))
}

fn create_store(
    path: &Path,
    year: i32,
    kind: EnergyKind,
    lats: &[f64],
    lons: &[f64],
    hours: usize,
    config: &StoreConfig,
) -> Result<()> {
    std::fs::create_dir_all(path)?;
    let store = Arc::new(
        FilesystemStore::new(path).map_err(|e| StoreError::storage(e.to_string()))?,
    );

    write_coordinate(&store, LAT_ARRAY, "lat", lats, "degrees_north")?;
    write_coordinate(&store, LON_ARRAY, "lon", lons, "degrees_east")?;
    write_marker_array(&store, lats.len(), lons.len())?;

    let mut attrs = serde_json::Map::new();
    attrs.insert(
        "_ARRAY_DIMENSIONS".to_string(),
        serde_json::json!(["lat", "lon", "hour"]),
    );
    attrs.insert("units".to_string(), serde_json::json!("MW"));
    attrs.insert("kind".to_string(), serde_json::json!(kind.as_str()));
    attrs.insert("year".to_string(), serde_json::json!(year));

    let chunk_grid: zarrs::array::ChunkGrid = vec![1u64, 1, hours as u64]
        .try_into()
        .map_err(|e| StoreError::Config(format!("{:?}", e)))?;

    let mut binding = ArrayBuilder::new(
        vec![lats.len() as u64, lons.len() as u64, hours as u64],
        DataType::Float64,
        chunk_grid,
        FillValue::from(f64::NAN),
    );
    let mut builder = binding.attributes(attrs);

    if config.compression != ZarrCompression::None {
        let codec = create_compression_codec(config)?;
        builder = builder.bytes_to_bytes_codecs(vec![codec]);
    }

    let array = builder
        .build(store.clone(), AC_ARRAY)
        .map_err(|e| StoreError::zarr(e.to_string()))?;
    array
        .store_metadata()
        .map_err(|e| StoreError::storage(e.to_string()))?;

    // Group metadata last: its presence marks the store as complete.
    let mut group_attrs = serde_json::Map::new();
    group_attrs.insert("year".to_string(), serde_json::json!(year));
    group_attrs.insert("kind".to_string(), serde_json::json!(kind.as_str()));
    group_attrs.insert(
        "compression".to_string(),
        serde_json::json!(config.compression.as_str()),
    );
    let group = GroupBuilder::new()
        .attributes(group_attrs)
        .build(store, "/")
        .map_err(|e| StoreError::zarr(e.to_string()))?;
    group
        .store_metadata()
        .map_err(|e| StoreError::storage(e.to_string()))?;

    Ok(())
}

fn write_coordinate(
    store: &Arc<FilesystemStore>,
    path: &str,
    name: &str,
    values: &[f64],
    units: &str,
) -> Result<()> {
    let n = values.len() as u64;

    let mut attrs = serde_json::Map::new();
    attrs.insert("_ARRAY_DIMENSIONS".to_string(), serde_json::json!([name]));
    attrs.insert("units".to_string(), serde_json::json!(units));

    let chunk_grid: zarrs::array::ChunkGrid = vec![n]
        .try_into()
        .map_err(|e| StoreError::Config(format!("{:?}", e)))?;

    let array = ArrayBuilder::new(vec![n], DataType::Float64, chunk_grid, FillValue::from(f64::NAN))
        .attributes(attrs)
        .build(store.clone(), path)
        .map_err(|e| StoreError::zarr(e.to_string()))?;
    array
        .store_metadata()
        .map_err(|e| StoreError::storage(e.to_string()))?;

    let subset = ArraySubset::new_with_start_shape(vec![0], vec![n])
        .map_err(|e| StoreError::zarr(e.to_string()))?;
    array
        .store_array_subset_elements(&subset, values)
        .map_err(|e| StoreError::zarr(e.to_string()))?;
    Ok(())
}

fn write_marker_array(store: &Arc<FilesystemStore>, num_lats: usize, num_lons: usize) -> Result<()> {
    let mut attrs = serde_json::Map::new();
    attrs.insert("_ARRAY_DIMENSIONS".to_string(), serde_json::json!(["lat", "lon"]));

    let chunk_grid: zarrs::array::ChunkGrid = vec![1u64, 1]
        .try_into()
        .map_err(|e| StoreError::Config(format!("{:?}", e)))?;

    let array = ArrayBuilder::new(
        vec![num_lats as u64, num_lons as u64],
        DataType::UInt8,
        chunk_grid,
        FillValue::from(0u8),
    )
    .attributes(attrs)
    .build(store.clone(), WRITTEN_ARRAY)
    .map_err(|e| StoreError::zarr(e.to_string()))?;
    array
        .store_metadata()
        .map_err(|e| StoreError::storage(e.to_string()))
}

fn read_coordinate(store: &Arc<FilesystemStore>, path: &str) -> Result<Vec<f64>> {
    let array = Array::open(store.clone(), path).map_err(|e| StoreError::zarr(e.to_string()))?;
    let subset = ArraySubset::new_with_shape(array.shape().to_vec());
    array
        .retrieve_array_subset_elements(&subset)
        .map_err(|e| StoreError::zarr(e.to_string()))
}

/// Create the compression codec based on configuration.
fn create_compression_codec(
    config: &StoreConfig,
) -> Result<Arc<dyn zarrs::array::codec::BytesToBytesCodecTraits>> {
    let level = BloscCompressionLevel::try_from(config.compression_level)
        .map_err(|_| StoreError::Config("Invalid compression level".to_string()))?;

    let shuffle = if config.shuffle {
        BloscShuffleMode::Shuffle
    } else {
        BloscShuffleMode::NoShuffle
    };

    // typesize is required when shuffle is enabled
    let typesize = if config.shuffle { Some(8) } else { None };

    let compressor = match config.compression {
        ZarrCompression::None => {
            return Err(StoreError::Config("No compression configured".to_string()))
        }
        ZarrCompression::BloscLz4 => BloscCompressor::LZ4,
        ZarrCompression::BloscZstd => BloscCompressor::Zstd,
    };

    let codec = BloscCodec::new(compressor, level, None, shuffle, typesize)
        .map_err(|e| StoreError::Config(e.to_string()))?;

    Ok(Arc::new(codec))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_store_path_naming() {
        let p = store_path(Path::new("/out"), 2018, EnergyKind::Wind);
        assert_eq!(p, PathBuf::from("/out/2018_wind_ac_generation.zarr"));
    }

    #[test]
    fn test_ensure_rejects_empty_shape() {
        let dir = TempDir::new().unwrap();
        let err = OutputGridStore::ensure(dir.path(), 2018, &[], &[1.0], 24, &StoreConfig::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidDimension(_)));
    }

    #[test]
    fn test_open_missing_store() {
        let dir = TempDir::new().unwrap();
        let err = OutputGridStore::open(dir.path(), 2018).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_cell_bounds_checked() {
        let dir = TempDir::new().unwrap();
        let store = OutputGridStore::ensure(
            dir.path(),
            2018,
            &[31.5, 32.0],
            &[-125.0],
            24,
            &StoreConfig::uncompressed(),
        )
        .unwrap();
        assert!(store.read_cell(EnergyKind::Solar, 2, 0).is_err());
        assert!(store.write_cell(EnergyKind::Solar, 0, 1, &[0.0; 24]).is_err());
        assert!(matches!(
            store.write_cell(EnergyKind::Solar, 0, 0, &[0.0; 23]),
            Err(StoreError::InvalidDimension(_))
        ));
    }
}
