//! Relative optical air mass.

/// Kasten (1966) relative air mass for a zenith angle in degrees.
///
/// Returns NaN when the sun is below the horizon (zenith > 90°).
pub fn relative_airmass_kasten1966(zenith: f64) -> f64 {
    if zenith > 90.0 || zenith.is_nan() {
        return f64::NAN;
    }
    1.0 / (zenith.to_radians().cos() + 0.15 * (93.885 - zenith).powf(-1.253))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::assert_approx_eq;

    #[test]
    fn test_airmass_zenith() {
        assert_approx_eq!(relative_airmass_kasten1966(0.0), 1.0, 0.002);
        assert_approx_eq!(relative_airmass_kasten1966(60.0), 2.0, 0.01);
    }

    #[test]
    fn test_airmass_below_horizon() {
        assert!(relative_airmass_kasten1966(90.5).is_nan());
        assert!(relative_airmass_kasten1966(f64::NAN).is_nan());
        assert!(relative_airmass_kasten1966(90.0).is_finite());
    }
}
