//! DISC direct normal irradiance model (Maxwell, 1987).

use crate::atmosphere::relative_airmass_kasten1966;
use crate::geometry::extra_radiation_spencer;

/// Lower bound on cos(zenith) when forming the clearness index.
pub const MIN_COS_ZENITH: f64 = 0.0;

/// Zenith (degrees) above which DNI is forced to zero.
pub const MAX_ZENITH: f64 = 90.0;

/// Air mass ceiling applied before the DISC polynomials.
pub const MAX_AIRMASS: f64 = 12.0;

/// One hour of DISC output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscOutput {
    /// Direct normal irradiance, W/m²
    pub dni: f64,
    /// Clearness index, NaN when undefined (e.g. GHI 0 with the sun down)
    pub kt: f64,
    /// Air mass after clipping, NaN below the horizon
    pub airmass: f64,
}

/// Ratio of GHI to extraterrestrial horizontal irradiance, clipped to
/// `[0, max_clearness_index]`. NaN inputs stay NaN.
pub fn clearness_index(
    ghi: f64,
    zenith: f64,
    extra_radiation: f64,
    min_cos_zenith: f64,
    max_clearness_index: f64,
) -> f64 {
    let cos_zenith = zenith.to_radians().cos();
    let horizontal_extra = extra_radiation * cos_zenith.max(min_cos_zenith);
    let kt = ghi / horizontal_extra;
    if kt.is_nan() {
        return f64::NAN;
    }
    kt.max(0.0).min(max_clearness_index)
}

/// Direct beam transmittance `Kn` and the clipped air mass.
pub(crate) fn disc_kn(kt: f64, airmass: f64) -> (f64, f64) {
    let am = if airmass.is_nan() {
        f64::NAN
    } else {
        airmass.min(MAX_AIRMASS)
    };

    let (a, b, c) = if kt <= 0.6 {
        (
            0.512 + kt * (-1.56 + kt * (2.286 - 2.222 * kt)),
            0.37 + 0.962 * kt,
            -0.28 + kt * (0.932 - 2.048 * kt),
        )
    } else {
        (
            -5.743 + kt * (21.77 + kt * (-27.49 + 11.56 * kt)),
            41.4 + kt * (-118.5 + kt * (66.05 + 31.9 * kt)),
            -47.01 + kt * (184.2 + kt * (-222.0 + 73.81 * kt)),
        )
    };

    let delta_kn = a + b * (c * am).exp();
    let knc = 0.866 + am * (-0.122 + am * (0.0121 + am * (-0.000653 + 1.4e-5 * am)));
    (knc - delta_kn, am)
}

/// DISC estimate for one hour.
///
/// * `ghi` - global horizontal irradiance, W/m²
/// * `zenith` - solar zenith, degrees
/// * `day_of_year` - calendar day used for extraterrestrial radiation
pub fn disc(ghi: f64, zenith: f64, day_of_year: u32) -> DiscOutput {
    let extra = extra_radiation_spencer(day_of_year);
    let kt = clearness_index(ghi, zenith, extra, MIN_COS_ZENITH, 1.0);
    let airmass = relative_airmass_kasten1966(zenith);
    let (kn, am) = disc_kn(kt, airmass);

    let mut dni = kn * extra;
    if zenith > MAX_ZENITH || ghi < 0.0 || dni < 0.0 {
        dni = 0.0;
    }

    DiscOutput {
        dni,
        kt,
        airmass: am,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::assert_approx_eq;

    #[test]
    fn test_clearness_index_clipping() {
        assert_eq!(clearness_index(2000.0, 0.0, 1367.0, 0.0, 1.0), 1.0);
        assert_eq!(clearness_index(-5.0, 0.0, 1367.0, 0.0, 1.0), 0.0);
        assert_approx_eq!(clearness_index(683.5, 0.0, 1367.0, 0.0, 1.0), 0.5, 1e-12);
    }

    #[test]
    fn test_clearness_index_night() {
        // Sun below the horizon: zero horizontal extraterrestrial irradiance
        assert!(clearness_index(0.0, 100.0, 1367.0, 0.0, 1.0).is_nan());
        assert_eq!(clearness_index(10.0, 100.0, 1367.0, 0.0, 1.0), 1.0);
    }

    #[test]
    fn test_disc_night_is_zero() {
        let out = disc(0.0, 120.0, 100);
        assert_eq!(out.dni, 0.0);
        assert!(out.airmass.is_nan());
    }

    #[test]
    fn test_disc_clear_sky_noon() {
        // Clear summer noon: high clearness gives substantial beam irradiance
        let out = disc(900.0, 20.0, 172);
        assert!(out.kt > 0.65 && out.kt < 0.75, "kt {}", out.kt);
        assert!(out.dni > 500.0 && out.dni < 900.0, "dni {}", out.dni);
    }

    #[test]
    fn test_disc_overcast() {
        // Heavily overcast: little direct beam
        let out = disc(100.0, 40.0, 172);
        assert!(out.kt < 0.2);
        assert!(out.dni >= 0.0 && out.dni < 50.0, "dni {}", out.dni);
    }

    #[test]
    fn test_disc_airmass_clipped() {
        let out = disc(5.0, 89.9, 172);
        assert_eq!(out.airmass, MAX_AIRMASS);
    }
}
