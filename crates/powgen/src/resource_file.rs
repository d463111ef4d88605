//! Intermediate resource files consumed by the external simulators.
//!
//! The solar file is a comma-separated table with a location header:
//!
//! ```text
//! Latitude,Longitude,Time Zone
//! 31.5,-125.0,0
//! Year,Month,Day,Hour,DNI,DHI,Wind Speed,Temperature
//! 2018,1,1,0,0.0,0.0,3.2,11.4
//! ```
//!
//! The wind file follows the SRW layout: a location record, a title, then
//! variable, unit and height rows ahead of the hourly data.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use powgen_common::{EnergyKind, HOURS_PER_DAY};
use tempfile::TempPath;
use tracing::debug;

use crate::derived::{DerivedResourceBundle, SolarDay};
use crate::error::{PowGenError, Result};

/// Render a float with at least one decimal place (`-125.0`, `100.0`), as
/// file names, headers and data rows expect it.
pub fn format_float(value: f64) -> String {
    format!("{value:?}")
}

/// Shared file stem for one cell and year: `<year>_<lat>_<lon>`.
pub fn resource_stem(year: i32, latitude: f64, longitude: f64) -> String {
    format!(
        "{}_{}_{}",
        year,
        format_float(latitude),
        format_float(longitude)
    )
}

fn csv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(writer)
}

fn write_failure(e: csv::Error) -> PowGenError {
    PowGenError::resource_write(e.to_string())
}

/// Write the solar resource table.
pub fn write_solar_resource<W: Write>(
    writer: W,
    year: i32,
    latitude: f64,
    longitude: f64,
    days: &[SolarDay],
    wind_speed: &[f64],
    temperature: &[f64],
) -> Result<()> {
    let hours = days.len() * HOURS_PER_DAY;
    if wind_speed.len() != hours || temperature.len() != hours {
        return Err(PowGenError::invalid_dimension(format!(
            "solar resource needs {} hours, got wind speed {} and temperature {}",
            hours,
            wind_speed.len(),
            temperature.len()
        )));
    }

    let mut wtr = csv_writer(writer);
    wtr.write_record(["Latitude", "Longitude", "Time Zone"])
        .map_err(write_failure)?;
    wtr.write_record([
        format_float(latitude),
        format_float(longitude),
        "0".to_string(),
    ])
    .map_err(write_failure)?;
    wtr.write_record([
        "Year",
        "Month",
        "Day",
        "Hour",
        "DNI",
        "DHI",
        "Wind Speed",
        "Temperature",
    ])
    .map_err(write_failure)?;

    for (day_idx, day) in days.iter().enumerate() {
        if day.dni.len() != HOURS_PER_DAY || day.dhi.len() != HOURS_PER_DAY {
            return Err(PowGenError::invalid_dimension(format!(
                "day {}/{} has {} DNI and {} DHI values",
                day.month,
                day.day,
                day.dni.len(),
                day.dhi.len()
            )));
        }
        for hour in 0..HOURS_PER_DAY {
            let idx = day_idx * HOURS_PER_DAY + hour;
            wtr.write_record([
                year.to_string(),
                day.month.to_string(),
                day.day.to_string(),
                hour.to_string(),
                format_float(day.dni[hour]),
                format_float(day.dhi[hour]),
                format_float(wind_speed[idx]),
                format_float(temperature[idx]),
            ])
            .map_err(write_failure)?;
        }
    }

    wtr.flush()
        .map_err(|e| PowGenError::resource_write(e.to_string()))
}

/// Write the wind resource table (SRW).
pub fn write_wind_resource<W: Write>(
    writer: W,
    year: i32,
    latitude: f64,
    longitude: f64,
    bundle: &DerivedResourceBundle,
) -> Result<()> {
    let rows = bundle.temperature_c.len();
    let columns = [
        &bundle.temperature_c,
        &bundle.pressure_atm,
        &bundle.speed_2m,
        &bundle.speed_10m,
        &bundle.speed_50m,
        &bundle.direction_50m,
    ];
    if columns.iter().any(|c| c.len() != rows) {
        return Err(PowGenError::invalid_dimension(
            "wind resource columns differ in length",
        ));
    }

    let mut wtr = csv_writer(writer);
    wtr.write_record([
        "loc id=?".to_string(),
        "city=?".to_string(),
        "state=?".to_string(),
        "country=?".to_string(),
        year.to_string(),
        format_float(latitude),
        format_float(longitude),
        "elevation=?".to_string(),
        "1".to_string(),
        rows.to_string(),
    ])
    .map_err(write_failure)?;
    wtr.write_record(["SAM wind power resource file"])
        .map_err(write_failure)?;
    wtr.write_record([
        "Temperature",
        "Pressure",
        "Speed",
        "Speed",
        "Speed",
        "Direction",
    ])
    .map_err(write_failure)?;
    wtr.write_record(["C", "atm", "m/s", "m/s", "m/s", "degrees"])
        .map_err(write_failure)?;
    wtr.write_record(["2", "2", "2", "10", "50", "50"])
        .map_err(write_failure)?;

    for i in 0..rows {
        wtr.write_record(columns.iter().map(|c| format_float(c[i])))
            .map_err(write_failure)?;
    }

    wtr.flush()
        .map_err(|e| PowGenError::resource_write(e.to_string()))
}

/// A resource file on disk, deleted when dropped.
#[derive(Debug)]
pub struct ResourceFile {
    kind: EnergyKind,
    path: TempPath,
}

impl ResourceFile {
    /// Write the solar file for one cell into `work_dir`.
    pub fn create_solar(
        work_dir: &Path,
        year: i32,
        latitude: f64,
        longitude: f64,
        days: &[SolarDay],
        bundle: &DerivedResourceBundle,
    ) -> Result<Self> {
        let stem = resource_stem(year, latitude, longitude);
        Self::create(work_dir, EnergyKind::Solar, &stem, ".csv", |file| {
            write_solar_resource(
                file,
                year,
                latitude,
                longitude,
                days,
                &bundle.speed_2m,
                &bundle.temperature_c,
            )
        })
    }

    /// Write the wind file for one cell into `work_dir`.
    pub fn create_wind(
        work_dir: &Path,
        year: i32,
        latitude: f64,
        longitude: f64,
        bundle: &DerivedResourceBundle,
    ) -> Result<Self> {
        let stem = resource_stem(year, latitude, longitude);
        Self::create(work_dir, EnergyKind::Wind, &stem, "_wp.srw", |file| {
            write_wind_resource(file, year, latitude, longitude, bundle)
        })
    }

    fn create<F>(
        work_dir: &Path,
        kind: EnergyKind,
        stem: &str,
        suffix: &str,
        write: F,
    ) -> Result<Self>
    where
        F: FnOnce(BufWriter<&mut File>) -> Result<()>,
    {
        let named = tempfile::Builder::new()
            .prefix(&format!("{stem}_"))
            .suffix(suffix)
            .tempfile_in(work_dir)
            .map_err(|e| {
                PowGenError::resource_write(format!(
                    "cannot create {kind} resource file in {}: {e}",
                    work_dir.display()
                ))
            })?;
        let (mut file, path) = named.into_parts();

        // `path` removes the file if writing fails
        write(BufWriter::new(&mut file))?;
        file.sync_all()
            .map_err(|e| PowGenError::resource_write(e.to_string()))?;
        drop(file);

        debug!(path = %path.display(), kind = %kind, "Wrote resource file");
        Ok(Self { kind, path })
    }

    pub fn kind(&self) -> EnergyKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
