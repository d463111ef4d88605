//! Sun position from day of year and hour.
//!
//! Times are naive UTC: the hour angle of hour `h` is measured at `h:00`
//! with no timezone offset.

use std::f64::consts::PI;

/// Solar constant used for extraterrestrial radiation (W/m²).
pub const SOLAR_CONSTANT: f64 = 1366.1;

/// Day angle `2π/365 * (doy - 1)` in radians.
fn day_angle(day_of_year: f64) -> f64 {
    (2.0 * PI / 365.0) * (day_of_year - 1.0)
}

/// Equation of time in minutes (PVCDROM approximation).
pub fn equation_of_time_pvcdrom(day_of_year: u32) -> f64 {
    let bday = day_angle(day_of_year as f64) - (2.0 * PI / 365.0) * 80.0;
    9.87 * (2.0 * bday).sin() - 7.53 * bday.cos() - 1.5 * bday.sin()
}

/// Solar declination in radians (Spencer, 1971).
pub fn declination_spencer71(day_of_year: u32) -> f64 {
    let a = day_angle(day_of_year as f64);
    0.006918 - 0.399912 * a.cos() + 0.070257 * a.sin() - 0.006758 * (2.0 * a).cos()
        + 0.000907 * (2.0 * a).sin()
        - 0.002697 * (3.0 * a).cos()
        + 0.00148 * (3.0 * a).sin()
}

/// Hour angle in degrees for a UTC hour of day.
///
/// * `hour` - hours since midnight UTC
/// * `longitude` - degrees east
/// * `equation_of_time` - minutes
pub fn hour_angle(hour: f64, longitude: f64, equation_of_time: f64) -> f64 {
    15.0 * (hour - 12.0) + longitude + equation_of_time / 4.0
}

/// Analytical solar zenith angle in radians.
///
/// All inputs in radians. The cosine is clamped to `[-1, 1]` so rounding
/// never turns an overhead sun into NaN.
pub fn solar_zenith_analytical(latitude: f64, hour_angle: f64, declination: f64) -> f64 {
    let cos_zenith = declination.cos() * latitude.cos() * hour_angle.cos()
        + declination.sin() * latitude.sin();
    cos_zenith.clamp(-1.0, 1.0).acos()
}

/// Extraterrestrial normal irradiance in W/m² (Spencer, 1971).
pub fn extra_radiation_spencer(day_of_year: u32) -> f64 {
    let b = day_angle(day_of_year as f64);
    let rover_r0_sqrd = 1.00011
        + 0.034221 * b.cos()
        + 0.00128 * b.sin()
        + 0.000719 * (2.0 * b).cos()
        + 0.000077 * (2.0 * b).sin();
    SOLAR_CONSTANT * rover_r0_sqrd
}
