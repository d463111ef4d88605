//! Regular latitude/longitude grid addressing.
//!
//! The raw reanalysis archive stores every location along a single flattened
//! spatial axis. A cell `(lat_idx, lon_idx)` lives at
//! `lat_idx * num_lons + lon_idx` on that axis.

use crate::error::{GridError, GridResult};
use serde::{Deserialize, Serialize};

/// Default latitude spacing of the reanalysis grid, in degrees.
pub const DEFAULT_LAT_STEP: f64 = 0.5;

/// Default longitude spacing of the reanalysis grid, in degrees.
pub const DEFAULT_LON_STEP: f64 = 0.625;

/// Shape and placement of the region being processed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of latitude rows in the output region
    pub num_lats: usize,
    /// Number of longitude columns in the output region
    pub num_lons: usize,
    /// Latitude of row 0 (degrees north)
    pub start_lat: f64,
    /// Longitude of column 0 (degrees east)
    pub start_lon: f64,
    /// Latitude spacing (degrees)
    pub lat_step: f64,
    /// Longitude spacing (degrees)
    pub lon_step: f64,
    /// Length of every hourly series (8760 for a 365-day year)
    pub hours_per_year: usize,
    /// Longitude count of the raw dataset's own grid, used for flat addressing.
    /// Falls back to `num_lons` when unset.
    pub dataset_num_lons: Option<usize>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            num_lats: 37,
            num_lons: 31,
            start_lat: 31.5,
            start_lon: -125.0,
            lat_step: DEFAULT_LAT_STEP,
            lon_step: DEFAULT_LON_STEP,
            hours_per_year: 8760,
            dataset_num_lons: None,
        }
    }
}

impl GridConfig {
    /// Latitude and longitude coordinate arrays of the region.
    pub fn coordinates(&self) -> GridResult<(Vec<f64>, Vec<f64>)> {
        build_coordinates(
            self.num_lats as i64,
            self.num_lons as i64,
            self.start_lat,
            self.start_lon,
            self.lat_step,
            self.lon_step,
        )
    }

    /// Longitude count used to address the raw dataset.
    pub fn dataset_lon_count(&self) -> usize {
        self.dataset_num_lons.unwrap_or(self.num_lons)
    }

    /// Flat index of a region cell within the raw dataset.
    pub fn dataset_index(&self, lat_idx: usize, lon_idx: usize) -> GridResult<usize> {
        let num_lons = self.dataset_lon_count();
        if lon_idx >= num_lons {
            return Err(GridError::IndexOutOfRange {
                index: lon_idx,
                limit: num_lons,
            });
        }
        flat_index(lat_idx, lon_idx, num_lons)
    }

    /// Number of whole days covered by one hourly series.
    pub fn days_per_year(&self) -> usize {
        self.hours_per_year / crate::HOURS_PER_DAY
    }

    /// Total number of cells in the region.
    pub fn cell_count(&self) -> usize {
        self.num_lats * self.num_lons
    }
}

/// Build the latitude and longitude arrays of a region as `start + i * step`.
///
/// Counts are signed so that a caller-supplied negative count is reported
/// rather than wrapped.
pub fn build_coordinates(
    num_lats: i64,
    num_lons: i64,
    start_lat: f64,
    start_lon: f64,
    lat_step: f64,
    lon_step: f64,
) -> GridResult<(Vec<f64>, Vec<f64>)> {
    if num_lats < 0 {
        return Err(GridError::invalid_dimension(format!(
            "num_lats must be non-negative, got {}",
            num_lats
        )));
    }
    if num_lons < 0 {
        return Err(GridError::invalid_dimension(format!(
            "num_lons must be non-negative, got {}",
            num_lons
        )));
    }

    let lats = (0..num_lats).map(|i| start_lat + i as f64 * lat_step).collect();
    let lons = (0..num_lons).map(|i| start_lon + i as f64 * lon_step).collect();
    Ok((lats, lons))
}

/// Encode a 2-D cell as a position on the flattened spatial axis.
pub fn flat_index(lat_idx: usize, lon_idx: usize, num_lons: usize) -> GridResult<usize> {
    if num_lons == 0 {
        return Err(GridError::invalid_dimension("num_lons must be positive"));
    }
    lat_idx
        .checked_mul(num_lons)
        .and_then(|v| v.checked_add(lon_idx))
        .ok_or_else(|| GridError::invalid_dimension("flat index overflows usize"))
}

/// Inverse of [`flat_index`]: `(idx / num_lons, idx % num_lons)`.
pub fn unflatten_index(idx: usize, num_lons: usize) -> GridResult<(usize, usize)> {
    if num_lons == 0 {
        return Err(GridError::invalid_dimension("num_lons must be positive"));
    }
    Ok((idx / num_lons, idx % num_lons))
}

/// Coordinates `min + i * step` for every value not exceeding `max`.
///
/// Used to derive a region's coordinate axis from its bounding values.
pub fn coordinates_from_bounds(min: f64, max: f64, step: f64) -> GridResult<Vec<f64>> {
    if !(step > 0.0) || !step.is_finite() {
        return Err(GridError::invalid_dimension(format!(
            "step must be a positive finite number, got {}",
            step
        )));
    }
    if !min.is_finite() || !max.is_finite() {
        return Err(GridError::invalid_dimension("bounds must be finite"));
    }

    // Tolerate accumulated rounding on the last value.
    let limit = max + step * 1e-9;
    let mut values = Vec::new();
    let mut i = 0usize;
    loop {
        let v = min + i as f64 * step;
        if v > limit {
            break;
        }
        values.push(v);
        i += 1;
    }
    Ok(values)
}
