//! Synthetic hourly series for pipeline tests.
//!
//! Every generator is deterministic so tests can assert exact values.

/// Hours in a 365-day year.
pub const HOURS_PER_YEAR: usize = 8760;

/// Global horizontal irradiance with a half-sine daytime hump.
///
/// Irradiance is zero outside `[sunrise, sunset)` (UTC hours) and peaks at
/// `peak` W/m² halfway between them.
///
/// ```
/// use test_utils::diurnal_ghi;
///
/// let ghi = diurnal_ghi(2, 800.0, 14, 2);
/// assert_eq!(ghi.len(), 48);
/// assert_eq!(ghi[10], 0.0);
/// assert!(ghi[14] > 0.0);
/// ```
pub fn diurnal_ghi(days: usize, peak: f64, sunrise: usize, daylight_hours: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(days * 24);
    for _ in 0..days {
        for hour in 0..24 {
            let since_sunrise = (hour + 24 - sunrise) % 24;
            let value = if since_sunrise < daylight_hours {
                let phase = (since_sunrise as f64 + 0.5) / daylight_hours as f64;
                peak * (std::f64::consts::PI * phase).sin()
            } else {
                0.0
            };
            data.push(value);
        }
    }
    data
}

/// 2 m temperature in Kelvin with a seasonal and a daily cycle.
///
/// Winter values drop below freezing so Celsius conversions produce
/// negative numbers.
pub fn seasonal_temperature_kelvin(hours: usize) -> Vec<f64> {
    (0..hours)
        .map(|h| {
            let day = h as f64 / 24.0;
            let seasonal = -12.0 * (2.0 * std::f64::consts::PI * day / 365.0).cos();
            let daily = 5.0 * (2.0 * std::f64::consts::PI * (h % 24) as f64 / 24.0).sin();
            273.15 + 8.0 + seasonal + daily
        })
        .collect()
}

/// Surface pressure in Pa oscillating around one standard atmosphere.
pub fn surface_pressure_pa(hours: usize) -> Vec<f64> {
    (0..hours)
        .map(|h| 101_325.0 + 800.0 * (h as f64 / 97.0).sin())
        .collect()
}

/// A wind component series oscillating between `mean - amplitude` and
/// `mean + amplitude` with the given period in hours.
pub fn wind_component(hours: usize, mean: f64, amplitude: f64, period: f64) -> Vec<f64> {
    (0..hours)
        .map(|h| mean + amplitude * (2.0 * std::f64::consts::PI * h as f64 / period).sin())
        .collect()
}

/// A series filled with a constant value.
pub fn constant_series(hours: usize, value: f64) -> Vec<f64> {
    vec![value; hours]
}

/// A series mixing zero, negative and fractional values, for round-trip checks.
pub fn mixed_sign_series(hours: usize) -> Vec<f64> {
    (0..hours)
        .map(|h| match h % 5 {
            0 => 0.0,
            1 => -(h as f64) / 7.0,
            2 => h as f64 * 0.1,
            3 => -273.15 + h as f64 * 1e-3,
            _ => (h as f64).sqrt(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diurnal_ghi_zero_at_night() {
        let ghi = diurnal_ghi(1, 900.0, 14, 10);
        for (hour, &v) in ghi.iter().enumerate() {
            let daytime = (14..24).contains(&hour);
            assert_eq!(v > 0.0, daytime, "hour {}", hour);
            assert!(v <= 900.0);
        }
    }

    #[test]
    fn test_diurnal_ghi_wraps_midnight() {
        let ghi = diurnal_ghi(1, 500.0, 20, 8);
        assert!(ghi[0] > 0.0);
        assert!(ghi[3] > 0.0);
        assert_eq!(ghi[4], 0.0);
    }

    #[test]
    fn test_temperature_has_negative_celsius() {
        let t = seasonal_temperature_kelvin(HOURS_PER_YEAR);
        assert_eq!(t.len(), HOURS_PER_YEAR);
        assert!(t.iter().any(|k| k - 273.15 < 0.0));
        assert!(t.iter().any(|k| k - 273.15 > 0.0));
    }

    #[test]
    fn test_mixed_sign_series() {
        let s = mixed_sign_series(10);
        assert!(s.contains(&0.0));
        assert!(s.iter().any(|v| *v < 0.0));
    }

    #[test]
    fn test_wind_component_bounds() {
        let u = wind_component(100, 5.0, 2.0, 24.0);
        assert!(u.iter().all(|v| (3.0..=7.0).contains(v)));
    }
}
