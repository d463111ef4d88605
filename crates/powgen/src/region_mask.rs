//! Region masks over the generation grid.
//!
//! Every grid point takes the band value of the nearest raster point. With
//! several rasters (one per state, say) the values are summed, so a point
//! covered by two regions reads 2. The mask is stored and written
//! longitude-major, like the wind classification, for turbine mapping.

use std::path::{Path, PathBuf};

use merra_reader::RegionRaster;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{PowGenError, Result};
use crate::resource_file::format_float;
use crate::spreadsheet::{write_lon_major_csv, write_spreadsheet};

#[derive(Debug, Clone, PartialEq)]
pub struct RegionMask {
    lats: Vec<f64>,
    lons: Vec<f64>,
    values: Vec<f64>,
}

impl RegionMask {
    /// An empty mask: every point outside.
    pub fn new(lats: Vec<f64>, lons: Vec<f64>) -> Self {
        let values = vec![0.0; lats.len() * lons.len()];
        Self { lats, lons, values }
    }

    /// Sum of `rasters` sampled at every grid point.
    pub fn from_rasters(lats: Vec<f64>, lons: Vec<f64>, rasters: &[RegionRaster]) -> Result<Self> {
        if rasters.is_empty() {
            return Err(PowGenError::Config(
                "a region mask needs at least one raster".to_string(),
            ));
        }
        let mut mask = Self::new(lats, lons);
        for raster in rasters {
            mask.add(raster);
        }
        Ok(mask)
    }

    /// Add `raster`'s value at the nearest raster point to every grid point.
    pub fn add(&mut self, raster: &RegionRaster) {
        let num_lats = self.lats.len();
        for (lon_idx, &lon) in self.lons.iter().enumerate() {
            for (lat_idx, &lat) in self.lats.iter().enumerate() {
                self.values[lon_idx * num_lats + lat_idx] += raster.value_near(lat, lon);
            }
        }
        debug!(
            raster_lats = raster.num_lats(),
            raster_lons = raster.num_lons(),
            "Applied region raster"
        );
    }

    pub fn num_lats(&self) -> usize {
        self.lats.len()
    }

    pub fn num_lons(&self) -> usize {
        self.lons.len()
    }

    pub fn get(&self, lon_idx: usize, lat_idx: usize) -> Option<f64> {
        if lon_idx >= self.lons.len() || lat_idx >= self.lats.len() {
            return None;
        }
        self.values.get(lon_idx * self.lats.len() + lat_idx).copied()
    }

    /// Values along one longitude, ordered by latitude.
    pub fn row(&self, lon_idx: usize) -> Option<&[f64]> {
        let width = self.lats.len();
        let start = lon_idx.checked_mul(width)?;
        self.values.get(start..start + width)
    }

    /// Number of grid points inside at least one region.
    pub fn covered(&self) -> usize {
        self.values.iter().filter(|v| **v > 0.0).count()
    }

    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> Result<()> {
        write_lon_major_csv(writer, &self.lats, &self.lons, |lon_idx, lat_idx| {
            self.get(lon_idx, lat_idx).map(format_float).unwrap_or_default()
        })
    }
}

/// Write the mask to `target`, or to a timestamped file next to it.
pub fn write_region_mask(mask: &RegionMask, target: &Path) -> Result<PathBuf> {
    let written = write_spreadsheet(target, "region mask", |file| mask.write_csv(file))?;
    info!(
        path = %written.display(),
        covered = mask.covered(),
        cells = mask.num_lats() * mask.num_lons(),
        "Region mask complete"
    );
    Ok(written)
}

/// Raster files (`*.nc`) directly inside `dir`, sorted by name.
pub fn discover_rasters(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut rasters = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|e| e.to_str()) == Some("nc")
        {
            rasters.push(entry.into_path());
        }
    }
    rasters.sort();
    debug!(dir = %dir.display(), count = rasters.len(), "Discovered region rasters");
    Ok(rasters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn coast() -> RegionRaster {
        // Fine raster: the western column is water (1), the rest land
        RegionRaster::new(
            vec![30.0, 30.25, 30.5],
            vec![-120.0, -119.5, -119.0],
            vec![
                1.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                1.0, 1.0, 0.0, //
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_mask_samples_nearest_point() {
        let mask =
            RegionMask::from_rasters(vec![30.0, 30.5], vec![-120.0, -119.375], &[coast()])
                .unwrap();

        assert_eq!(mask.num_lons(), 2);
        assert_eq!(mask.row(0), Some(&[1.0, 1.0][..]));
        // -119.375 is nearest -119.5
        assert_eq!(mask.row(1), Some(&[0.0, 1.0][..]));
        assert_eq!(mask.get(1, 1), Some(1.0));
        assert_eq!(mask.get(2, 0), None);
        assert_eq!(mask.covered(), 3);
    }

    #[test]
    fn test_state_rasters_are_summed() {
        let west = RegionRaster::new(vec![30.0], vec![-120.0, -119.0], vec![1.0, 0.0]).unwrap();
        let east = RegionRaster::new(vec![30.0], vec![-120.0, -119.0], vec![0.0, 1.0]).unwrap();
        let both = RegionRaster::new(vec![30.0], vec![-120.0, -119.0], vec![1.0, 1.0]).unwrap();

        let mask =
            RegionMask::from_rasters(vec![30.0], vec![-120.0, -119.0], &[west, east, both])
                .unwrap();
        assert_eq!(mask.row(0), Some(&[2.0][..]));
        assert_eq!(mask.row(1), Some(&[2.0][..]));
    }

    #[test]
    fn test_no_rasters_is_config_error() {
        let err = RegionMask::from_rasters(vec![30.0], vec![-120.0], &[]).unwrap_err();
        assert!(matches!(err, PowGenError::Config(_)));
    }

    #[test]
    fn test_csv_is_longitude_major() {
        let mask =
            RegionMask::from_rasters(vec![30.0, 30.5], vec![-120.0, -119.375], &[coast()])
                .unwrap();
        let mut out = Vec::new();
        mask.write_csv(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "lon\\lat,30.0,30.5\n-120.0,1.0,1.0\n-119.375,0.0,1.0\n"
        );
    }

    #[test]
    fn test_discover_rasters() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["wyoming.nc", "california.nc", "readme.txt", "nevada.nc.part"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("oregon.nc")).unwrap();

        let found = discover_rasters(dir.path()).unwrap();
        assert_eq!(
            found,
            vec![dir.path().join("california.nc"), dir.path().join("wyoming.nc")]
        );
    }

    #[test]
    fn test_write_region_mask_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("offshore_bounds.csv");
        fs::write(&target, "older run").unwrap();

        let mask = RegionMask::new(vec![30.0], vec![-120.0]);
        let written = write_region_mask(&mask, &target).unwrap();
        assert_ne!(written, target);
        assert_eq!(fs::read_to_string(&target).unwrap(), "older run");
        assert_eq!(
            fs::read_to_string(&written).unwrap(),
            "lon\\lat,30.0\n-120.0,0.0\n"
        );
    }
}
