//! Derived quantities: wind speed and direction, unit conversions, shear
//! extrapolation and the per-day irradiance split.

use chrono::{Datelike, NaiveDate};
use irradiance::{decompose_day, DayInput};
use merra_reader::RawResourceBundle;
use powgen_common::{month_day, HOURS_PER_DAY};

use crate::error::{PowGenError, Result};

/// Standard atmosphere, Pa.
pub const STANDARD_ATMOSPHERE_PA: f64 = 101_325.0;

/// Offset between kelvin and degrees Celsius.
pub const KELVIN_OFFSET: f64 = 273.15;

/// Ratio between the 50 m and 10 m reference heights.
const SHEAR_HEIGHT_RATIO: f64 = 50.0 / 10.0;

/// Ratio between 100 m and the 50 m reference height.
const EXTRAPOLATION_HEIGHT_RATIO: f64 = 2.0;

/// Horizontal wind speed from its components.
pub fn speed(u: f64, v: f64) -> f64 {
    (u * u + v * v).sqrt()
}

/// Meteorological wind direction in degrees: the bearing the wind blows
/// from, clockwise from north. A calm (zero) vector reports 0.
pub fn direction(u: f64, v: f64) -> f64 {
    if u > 0.0 {
        if v == 0.0 {
            270.0
        } else {
            270.0 - (v / u).atan().to_degrees()
        }
    } else if u < 0.0 {
        if v == 0.0 {
            90.0
        } else {
            90.0 - (v / u).atan().to_degrees()
        }
    } else if v > 0.0 {
        180.0
    } else {
        // Northerly or calm
        0.0
    }
}

fn check_lengths(what: &str, u: &[f64], v: &[f64]) -> Result<()> {
    if u.len() != v.len() {
        return Err(PowGenError::invalid_dimension(format!(
            "{what}: u has {} values, v has {}",
            u.len(),
            v.len()
        )));
    }
    Ok(())
}

/// Elementwise wind speed.
pub fn wind_speed(u: &[f64], v: &[f64]) -> Result<Vec<f64>> {
    check_lengths("wind speed", u, v)?;
    Ok(u.iter().zip(v).map(|(&u, &v)| speed(u, v)).collect())
}

/// Elementwise wind direction.
pub fn wind_direction(u: &[f64], v: &[f64]) -> Result<Vec<f64>> {
    check_lengths("wind direction", u, v)?;
    Ok(u.iter().zip(v).map(|(&u, &v)| direction(u, v)).collect())
}

/// Surface pressure in atmospheres.
pub fn pressure_ratio(pa: &[f64]) -> Vec<f64> {
    pa.iter().map(|p| p / STANDARD_ATMOSPHERE_PA).collect()
}

pub fn kelvin_to_celsius(kelvin: &[f64]) -> Vec<f64> {
    kelvin.iter().map(|k| k - KELVIN_OFFSET).collect()
}

/// Power-law shear exponent fitted from the 50 m and 10 m speeds.
pub fn shear_exponent(v50: f64, v10: f64) -> Result<f64> {
    if !v10.is_finite() || v10 <= 0.0 {
        return Err(PowGenError::InvalidWindSample(format!(
            "10 m speed must be positive, got {v10}"
        )));
    }
    if !v50.is_finite() || v50 < 0.0 {
        return Err(PowGenError::InvalidWindSample(format!(
            "50 m speed must be non-negative, got {v50}"
        )));
    }
    Ok((v50 / v10).ln() / SHEAR_HEIGHT_RATIO.ln())
}

/// Wind speed at 100 m from the 50 m speed and the 50/10 m shear.
pub fn extrapolate_to_100m(v50: f64, v10: f64) -> Result<f64> {
    let alpha = shear_exponent(v50, v10)?;
    if v50 == 0.0 {
        return Ok(0.0);
    }
    Ok(v50 * EXTRAPOLATION_HEIGHT_RATIO.powf(alpha))
}

/// Elementwise [`extrapolate_to_100m`]; the failing hour is named in the error.
pub fn extrapolate_series(v50: &[f64], v10: &[f64]) -> Result<Vec<f64>> {
    if v50.len() != v10.len() {
        return Err(PowGenError::invalid_dimension(format!(
            "shear: v50 has {} values, v10 has {}",
            v50.len(),
            v10.len()
        )));
    }
    v50.iter()
        .zip(v10)
        .enumerate()
        .map(|(hour, (&hi, &lo))| {
            extrapolate_to_100m(hi, lo).map_err(|e| match e {
                PowGenError::InvalidWindSample(msg) => {
                    PowGenError::InvalidWindSample(format!("hour {hour}: {msg}"))
                }
                other => other,
            })
        })
        .collect()
}

/// Median of a series, averaging the middle pair for even lengths.
///
/// Returns `None` for an empty series and NaN if any value is NaN.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    if values.iter().any(|v| v.is_nan()) {
        return Some(f64::NAN);
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Hourly series in the units the simulators expect.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedResourceBundle {
    /// W/m²
    pub ghi: Vec<f64>,
    /// m/s
    pub speed_2m: Vec<f64>,
    pub speed_10m: Vec<f64>,
    pub speed_50m: Vec<f64>,
    /// Degrees from north
    pub direction_50m: Vec<f64>,
    /// atm
    pub pressure_atm: Vec<f64>,
    /// °C
    pub temperature_c: Vec<f64>,
}

impl DerivedResourceBundle {
    pub fn len(&self) -> usize {
        self.ghi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ghi.is_empty()
    }
}

pub fn derive_bundle(raw: &RawResourceBundle) -> Result<DerivedResourceBundle> {
    Ok(DerivedResourceBundle {
        ghi: raw.ghi.clone(),
        speed_2m: wind_speed(&raw.u2m, &raw.v2m)?,
        speed_10m: wind_speed(&raw.u10m, &raw.v10m)?,
        speed_50m: wind_speed(&raw.u50m, &raw.v50m)?,
        direction_50m: wind_direction(&raw.u50m, &raw.v50m)?,
        pressure_atm: pressure_ratio(&raw.ps),
        temperature_c: kelvin_to_celsius(&raw.t2m),
    })
}

/// DNI and DHI for one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct SolarDay {
    pub month: u32,
    pub day: u32,
    pub dni: Vec<f64>,
    pub dhi: Vec<f64>,
}

/// Split an hourly GHI year into per-day DNI/DHI records.
///
/// Days follow the fixed 365-day table; the real calendar date only feeds
/// the extraterrestrial radiation term, so leap years shift it by one day
/// from March on.
pub fn decompose_irradiance(
    year: i32,
    latitude: f64,
    longitude: f64,
    ghi: &[f64],
) -> Result<Vec<SolarDay>> {
    if ghi.len() % HOURS_PER_DAY != 0 {
        return Err(PowGenError::invalid_dimension(format!(
            "GHI series of {} hours is not a whole number of days",
            ghi.len()
        )));
    }

    ghi.chunks(HOURS_PER_DAY)
        .enumerate()
        .map(|(i, day_ghi)| {
            let day_of_year = i as u32 + 1;
            let (month, day) = month_day(i64::from(day_of_year))?;
            let calendar_day_of_year = NaiveDate::from_ymd_opt(year, month, day)
                .map(|date| date.ordinal())
                .ok_or_else(|| {
                    PowGenError::invalid_dimension(format!(
                        "no calendar date for {year}-{month:02}-{day:02}"
                    ))
                })?;

            let split = decompose_day(DayInput {
                latitude,
                longitude,
                day_of_year,
                calendar_day_of_year,
                ghi: day_ghi,
            })?;

            Ok(SolarDay {
                month,
                day,
                dni: split.dni,
                dhi: split.dhi,
            })
        })
        .collect()
}
