//! Region rasters: a `Band1` grid over `lat`/`lon` axes marking which
//! points belong to a region (a coastline buffer, a state, ...).
//!
//! Grid points are matched to the raster by nearest axis value, independently
//! per axis. Ties go to the lower index.

use crate::error::{ReaderError, ReaderResult};

/// A region raster with `band` laid out latitude-major (`lat * num_lons + lon`).
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRaster {
    lats: Vec<f64>,
    lons: Vec<f64>,
    band: Vec<f64>,
}

impl RegionRaster {
    pub fn new(lats: Vec<f64>, lons: Vec<f64>, band: Vec<f64>) -> ReaderResult<Self> {
        if lats.is_empty() || lons.is_empty() {
            return Err(ReaderError::invalid_format(format!(
                "region raster axes must be non-empty, got {} lats and {} lons",
                lats.len(),
                lons.len()
            )));
        }
        if band.len() != lats.len() * lons.len() {
            return Err(ReaderError::invalid_format(format!(
                "Band1 holds {} values for a {}x{} raster",
                band.len(),
                lats.len(),
                lons.len()
            )));
        }
        Ok(Self { lats, lons, band })
    }

    pub fn num_lats(&self) -> usize {
        self.lats.len()
    }

    pub fn num_lons(&self) -> usize {
        self.lons.len()
    }

    /// Band value at the raster point nearest to `(lat, lon)`. Non-finite
    /// band values count as outside the region (0).
    pub fn value_near(&self, lat: f64, lon: f64) -> f64 {
        let (Some(lat_idx), Some(lon_idx)) =
            (nearest_index(&self.lats, lat), nearest_index(&self.lons, lon))
        else {
            return 0.0;
        };
        let value = self.band[lat_idx * self.lons.len() + lon_idx];
        if value.is_finite() {
            value
        } else {
            0.0
        }
    }
}

/// First index of the axis value closest to `target`.
pub fn nearest_index(axis: &[f64], target: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, value) in axis.iter().enumerate() {
        let distance = (value - target).abs();
        if distance.is_nan() {
            continue;
        }
        match best {
            Some((_, d)) if d <= distance => {}
            _ => best = Some((idx, distance)),
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster() -> RegionRaster {
        // 2 lats x 3 lons
        RegionRaster::new(
            vec![30.0, 31.0],
            vec![-120.0, -119.0, -118.0],
            vec![
                0.0, 1.0, 1.0, // lat 30
                1.0, f64::NAN, 0.0, // lat 31
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_nearest_index() {
        let axis = [30.0, 30.5, 31.0];
        assert_eq!(nearest_index(&axis, 30.6), Some(1));
        assert_eq!(nearest_index(&axis, 40.0), Some(2));
        assert_eq!(nearest_index(&axis, -5.0), Some(0));
        // Equidistant: lower index wins
        assert_eq!(nearest_index(&axis, 30.25), Some(0));
        assert_eq!(nearest_index(&[], 1.0), None);
        assert_eq!(nearest_index(&[f64::NAN, 2.0], 0.0), Some(1));
    }

    #[test]
    fn test_value_near() {
        let r = raster();
        assert_eq!(r.value_near(30.1, -119.2), 1.0);
        assert_eq!(r.value_near(29.0, -121.0), 0.0);
        assert_eq!(r.value_near(31.4, -120.3), 1.0);
        // Fill values count as outside
        assert_eq!(r.value_near(31.0, -119.0), 0.0);
    }

    #[test]
    fn test_rejects_band_size_mismatch() {
        let err = RegionRaster::new(vec![30.0], vec![-120.0, -119.0], vec![1.0]).unwrap_err();
        assert!(matches!(err, ReaderError::InvalidFormat(_)));
        assert!(RegionRaster::new(Vec::new(), vec![1.0], Vec::new()).is_err());
    }
}
