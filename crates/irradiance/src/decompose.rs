//! Per-day GHI decomposition into DNI and DHI.

use crate::dirint::dirint;
use crate::error::{IrradianceError, IrradianceResult};
use crate::geometry::{
    declination_spencer71, equation_of_time_pvcdrom, hour_angle, solar_zenith_analytical,
};

/// One day of hourly GHI at a location.
#[derive(Debug, Clone, Copy)]
pub struct DayInput<'a> {
    /// Latitude, degrees north
    pub latitude: f64,
    /// Longitude, degrees east
    pub longitude: f64,
    /// Sequential day number within the series (1..=365), drives the
    /// equation of time and declination
    pub day_of_year: u32,
    /// Day of year of the actual calendar date, drives extraterrestrial
    /// radiation; differs from `day_of_year` after Feb 28 in leap years
    pub calendar_day_of_year: u32,
    /// GHI for hours 0, 1, ... UTC, W/m²
    pub ghi: &'a [f64],
}

/// Decomposed irradiance for one day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayIrradiance {
    /// Direct normal irradiance, W/m²
    pub dni: Vec<f64>,
    /// Diffuse horizontal irradiance, W/m²
    pub dhi: Vec<f64>,
    /// Solar zenith, degrees
    pub zenith: Vec<f64>,
}

/// Solar zenith in degrees for each UTC hour `0..hours` of a day.
pub fn hourly_zenith(latitude: f64, longitude: f64, day_of_year: u32, hours: usize) -> Vec<f64> {
    let eot = equation_of_time_pvcdrom(day_of_year);
    let declination = declination_spencer71(day_of_year);
    let lat_rad = latitude.to_radians();

    (0..hours)
        .map(|h| {
            let ha = hour_angle(h as f64, longitude, eot).to_radians();
            solar_zenith_analytical(lat_rad, ha, declination).to_degrees()
        })
        .collect()
}

/// Split one day of GHI into DNI and DHI.
///
/// Undefined DNI (night, unbinnable hours) becomes 0, and
/// `DHI = GHI - DNI * cos(zenith)` with non-finite results also set to 0.
pub fn decompose_day(input: DayInput<'_>) -> IrradianceResult<DayIrradiance> {
    if !(1..=366).contains(&input.calendar_day_of_year) {
        return Err(IrradianceError::InvalidDayOfYear(input.calendar_day_of_year));
    }
    if !(1..=366).contains(&input.day_of_year) {
        return Err(IrradianceError::InvalidDayOfYear(input.day_of_year));
    }

    let zenith = hourly_zenith(
        input.latitude,
        input.longitude,
        input.day_of_year,
        input.ghi.len(),
    );

    let dni: Vec<f64> = dirint(input.ghi, &zenith, input.calendar_day_of_year)?
        .into_iter()
        .map(|v| if v.is_finite() { v } else { 0.0 })
        .collect();

    let dhi = input
        .ghi
        .iter()
        .zip(&dni)
        .zip(&zenith)
        .map(|((&g, &d), &z)| {
            let v = g - d * z.to_radians().cos();
            if v.is_finite() {
                v
            } else {
                0.0
            }
        })
        .collect();

    Ok(DayIrradiance { dni, dhi, zenith })
}
