//! Longitude-major CSV grids with a never-overwrite output policy.
//!
//! Layout: a header of latitudes, then one row per longitude.
//!
//! ```text
//! lon\lat,41.0,41.5
//! -105.0,0,1
//! -104.375,3,2
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::{info, warn};

use crate::error::{PowGenError, Result};
use crate::resource_file::format_float;

/// Write a grid as CSV; `cell(lon_idx, lat_idx)` renders one value.
pub fn write_lon_major_csv<W, F>(writer: W, lats: &[f64], lons: &[f64], cell: F) -> Result<()>
where
    W: Write,
    F: Fn(usize, usize) -> String,
{
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    let failure = |e: csv::Error| PowGenError::resource_write(e.to_string());

    let header =
        std::iter::once("lon\\lat".to_string()).chain(lats.iter().map(|&lat| format_float(lat)));
    wtr.write_record(header).map_err(failure)?;

    for (lon_idx, &lon) in lons.iter().enumerate() {
        let record = std::iter::once(format_float(lon))
            .chain((0..lats.len()).map(|lat_idx| cell(lon_idx, lat_idx)));
        wtr.write_record(record).map_err(failure)?;
    }

    wtr.flush()
        .map_err(|e| PowGenError::resource_write(e.to_string()))
}

/// Timestamp-qualified alternate for `target`: `Run_<dd_mm_YYYY HH_MM_SS>`
/// in the same directory, suffixed with a counter if that name is taken too.
pub fn fallback_path(target: &Path, now: NaiveDateTime) -> PathBuf {
    let dir = target.parent().unwrap_or_else(|| Path::new(""));
    let ext = target
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("csv");
    let base = format!("Run_{}", now.format("%d_%m_%Y %H_%M_%S"));

    let mut candidate = dir.join(format!("{base}.{ext}"));
    let mut counter = 1;
    while candidate.exists() {
        candidate = dir.join(format!("{base}_{counter}.{ext}"));
        counter += 1;
    }
    candidate
}

fn write_new<F>(path: &Path, write: &F) -> Result<()>
where
    F: Fn(File) -> Result<()>,
{
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)?;
    write(file)
}

/// Write to `target`, or to a fresh timestamped file next to it when
/// `target` exists or cannot be written. Returns the path actually written.
pub fn write_spreadsheet<F>(target: &Path, what: &str, write: F) -> Result<PathBuf>
where
    F: Fn(File) -> Result<()>,
{
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    match write_new(target, &write) {
        Ok(()) => {
            info!(path = %target.display(), what = what, "Wrote spreadsheet");
            return Ok(target.to_path_buf());
        }
        Err(e) => {
            warn!(
                path = %target.display(),
                what = what,
                error = %e,
                "Cannot write spreadsheet, using a timestamped file"
            );
        }
    }

    let alternate = fallback_path(target, Local::now().naive_local());
    write_new(&alternate, &write)?;
    info!(path = %alternate.display(), what = what, "Wrote spreadsheet");
    Ok(alternate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_lon_major_layout() {
        let mut out = Vec::new();
        write_lon_major_csv(&mut out, &[30.0, 30.5], &[-120.0, -119.375], |lon, lat| {
            format!("{lon}{lat}")
        })
        .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "lon\\lat,30.0,30.5\n-120.0,00,01\n-119.375,10,11\n"
        );
    }

    #[test]
    fn test_fallback_path_format() {
        let now = NaiveDate::from_ymd_opt(2019, 7, 4)
            .unwrap()
            .and_hms_opt(13, 5, 9)
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("wind_class.csv");

        let first = fallback_path(&target, now);
        assert_eq!(first, dir.path().join("Run_04_07_2019 13_05_09.csv"));

        fs::write(&first, "taken").unwrap();
        let second = fallback_path(&target, now);
        assert_eq!(second, dir.path().join("Run_04_07_2019 13_05_09_1.csv"));
    }

    #[test]
    fn test_existing_target_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out").join("grid.csv");

        let first = write_spreadsheet(&target, "test grid", |mut f| {
            Ok(f.write_all(b"first\n")?)
        })
        .unwrap();
        assert_eq!(first, target);

        let second = write_spreadsheet(&target, "test grid", |mut f| {
            Ok(f.write_all(b"second\n")?)
        })
        .unwrap();
        assert_ne!(second, target);
        assert_eq!(fs::read_to_string(&target).unwrap(), "first\n");
        assert_eq!(fs::read_to_string(&second).unwrap(), "second\n");
    }
}
