//! IEC wind-class aggregation over several years.
//!
//! Each cell's representative speed for a year is the median of the hourly
//! 100 m speed extrapolated from the 50 m and 10 m winds. The multi-year
//! mean of those medians is then classified:
//!
//! | mean speed (m/s) | class |
//! |------------------|-------|
//! | `>= 9`           | 1     |
//! | `[8, 9)`         | 2     |
//! | `[6.5, 8)`       | 3     |
//! | `< 6.5` or NaN   | 0     |

use std::path::{Path, PathBuf};
use std::time::Instant;

use merra_reader::{extract_wind_pair, DatasetSource, WindPair};
use powgen_common::{flat_index, GridConfig};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::derived::{extrapolate_series, median, wind_speed};
use crate::error::{PowGenError, Result};
use crate::spreadsheet::{write_lon_major_csv, write_spreadsheet};

/// Class for cells whose wind resource is too weak.
pub const CLASS_UNSUITABLE: u8 = 0;

/// Map a mean 100 m wind speed onto its IEC class.
pub fn classify_speed(speed: f64) -> u8 {
    if speed >= 9.0 {
        1
    } else if speed >= 8.0 {
        2
    } else if speed >= 6.5 {
        3
    } else {
        CLASS_UNSUITABLE
    }
}

/// Median extrapolated 100 m speed of one location's hourly winds.
pub fn representative_speed(pair: &WindPair) -> Result<f64> {
    let v50 = wind_speed(&pair.u50m, &pair.v50m)?;
    let v10 = wind_speed(&pair.u10m, &pair.v10m)?;
    let v100 = extrapolate_series(&v50, &v10)?;
    median(&v100).ok_or_else(|| PowGenError::invalid_dimension("empty wind series"))
}

/// Classes stored longitude-major: one row per longitude.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationGrid {
    lats: Vec<f64>,
    lons: Vec<f64>,
    classes: Vec<u8>,
}

impl ClassificationGrid {
    /// Classify `mean_speed`, laid out latitude-major (`lat * num_lons + lon`).
    pub fn from_mean_speeds(lats: Vec<f64>, lons: Vec<f64>, mean_speed: &[f64]) -> Result<Self> {
        if mean_speed.len() != lats.len() * lons.len() {
            return Err(PowGenError::invalid_dimension(format!(
                "{} mean speeds for a {}x{} grid",
                mean_speed.len(),
                lats.len(),
                lons.len()
            )));
        }

        let mut classes = Vec::with_capacity(mean_speed.len());
        for lon_idx in 0..lons.len() {
            for lat_idx in 0..lats.len() {
                let idx = flat_index(lat_idx, lon_idx, lons.len())?;
                classes.push(classify_speed(mean_speed[idx]));
            }
        }

        Ok(Self {
            lats,
            lons,
            classes,
        })
    }

    pub fn num_lats(&self) -> usize {
        self.lats.len()
    }

    pub fn num_lons(&self) -> usize {
        self.lons.len()
    }

    pub fn get(&self, lon_idx: usize, lat_idx: usize) -> Option<u8> {
        if lon_idx >= self.lons.len() || lat_idx >= self.lats.len() {
            return None;
        }
        self.classes.get(lon_idx * self.lats.len() + lat_idx).copied()
    }

    /// Classes along one longitude, ordered by latitude.
    pub fn row(&self, lon_idx: usize) -> Option<&[u8]> {
        let width = self.lats.len();
        let start = lon_idx.checked_mul(width)?;
        self.classes.get(start..start + width)
    }

    /// Write as CSV: a header of latitudes, then one row per longitude.
    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> Result<()> {
        write_lon_major_csv(writer, &self.lats, &self.lons, |lon_idx, lat_idx| {
            self.get(lon_idx, lat_idx)
                .map(|c| c.to_string())
                .unwrap_or_default()
        })
    }
}

/// Aggregated result of a wind-class run.
#[derive(Debug, Clone, PartialEq)]
pub struct WindClassSummary {
    pub years: Vec<i32>,
    /// Multi-year mean of the yearly medians, latitude-major
    pub mean_speed: Vec<f64>,
    pub classes: ClassificationGrid,
}

impl WindClassSummary {
    pub fn mean_speed_at(&self, lat_idx: usize, lon_idx: usize) -> Option<f64> {
        let idx = flat_index(lat_idx, lon_idx, self.classes.num_lons()).ok()?;
        self.mean_speed.get(idx).copied()
    }
}

/// Averages yearly representative speeds and classifies each cell.
pub struct WindClassAggregator<'a> {
    grid: &'a GridConfig,
    source: &'a dyn DatasetSource,
}

impl<'a> WindClassAggregator<'a> {
    pub fn new(grid: &'a GridConfig, source: &'a dyn DatasetSource) -> Self {
        Self { grid, source }
    }

    pub fn run(&self, years: &[i32]) -> Result<WindClassSummary> {
        if years.is_empty() {
            return Err(PowGenError::Config(
                "wind classification needs at least one year".to_string(),
            ));
        }

        let (lats, lons) = self.grid.coordinates()?;
        let mut sum = vec![0.0; lats.len() * lons.len()];

        for &year in years {
            let start = Instant::now();
            let dataset = self.source.open_year(year)?;

            for lat_idx in 0..lats.len() {
                for lon_idx in 0..lons.len() {
                    let index = self.grid.dataset_index(lat_idx, lon_idx)?;
                    let pair = extract_wind_pair(dataset.as_ref(), index)?;
                    let speed = representative_speed(&pair).map_err(|e| match e {
                        PowGenError::InvalidWindSample(msg) => PowGenError::InvalidWindSample(
                            format!(
                                "year {year}, lat {}, lon {}: {msg}",
                                lats[lat_idx], lons[lon_idx]
                            ),
                        ),
                        other => other,
                    })?;
                    sum[flat_index(lat_idx, lon_idx, lons.len())?] += speed;
                }
                debug!(year = year, lat = lats[lat_idx], "Latitude row aggregated");
            }

            info!(
                year = year,
                cells = sum.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Year aggregated"
            );
        }

        let count = years.len() as f64;
        let mean_speed: Vec<f64> = sum.into_iter().map(|s| s / count).collect();
        let classes = ClassificationGrid::from_mean_speeds(lats, lons, &mean_speed)?;

        Ok(WindClassSummary {
            years: years.to_vec(),
            mean_speed,
            classes,
        })
    }
}

/// Write the classification to `target`, or to a fresh timestamped file
/// next to it when `target` exists or cannot be written. Returns the path
/// actually written.
pub fn write_classification(grid: &ClassificationGrid, target: &Path) -> Result<PathBuf> {
    write_spreadsheet(target, "wind classification", |file| grid.write_csv(file))
}

/// Years of the archives in `dir` named `<prefix><YYYY>.nc`, ascending.
pub fn discover_years(dir: &Path, prefix: &str) -> Result<Vec<i32>> {
    let mut years = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        let Some(stem) = name
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix(".nc"))
        else {
            continue;
        };
        let Some(digits) = stem.len().checked_sub(4).and_then(|at| stem.get(at..)) else {
            continue;
        };
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        if let Ok(year) = digits.parse::<i32>() {
            years.push(year);
        }
    }

    years.sort_unstable();
    years.dedup();
    debug!(dir = %dir.display(), years = ?years, "Discovered archive years");
    Ok(years)
}
