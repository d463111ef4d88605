//! DIRINT direct normal irradiance model (Perez et al., 1992).
//!
//! DIRINT refines the DISC estimate with a coefficient chosen from four
//! binned inputs: the zenith-independent clearness index `kt'`, the solar
//! zenith, the hour-to-hour variability of `kt'`, and precipitable water.
//! Precipitable water is never available here, so its "missing" bin is used.

use crate::coefficients::DIRINT_COEFFS;
use crate::disc::disc;
use crate::error::{IrradianceError, IrradianceResult};

/// Column of the coefficient table used when dew point is unknown.
const W_BIN_MISSING: usize = 4;

/// Zenith-independent clearness index `kt'`, clipped to `[0, 1]`.
pub fn clearness_index_zenith_independent(kt: f64, airmass: f64) -> f64 {
    let factor = 1.031 * (-1.4 / (0.9 + 9.4 / airmass)).exp() + 0.1;
    let kt_prime = kt / factor;
    if kt_prime.is_nan() {
        return f64::NAN;
    }
    kt_prime.clamp(0.0, 1.0)
}

/// Variability of `kt'` around each hour.
///
/// `0.5 * (|k[i] - k[i+1]| + |k[i] - k[i-1]|)`, where the first hour uses its
/// successor in place of the missing predecessor and the last hour uses its
/// predecessor in place of the missing successor. A NaN term counts as zero
/// unless both terms are NaN.
pub fn delta_kt_prime(kt_prime: &[f64]) -> Vec<f64> {
    let n = kt_prime.len();
    (0..n)
        .map(|i| {
            let next = if i + 1 < n {
                kt_prime[i + 1]
            } else if i > 0 {
                kt_prime[i - 1]
            } else {
                f64::NAN
            };
            let prev = if i > 0 {
                kt_prime[i - 1]
            } else if i + 1 < n {
                kt_prime[i + 1]
            } else {
                f64::NAN
            };

            let a = (kt_prime[i] - next).abs();
            let b = (kt_prime[i] - prev).abs();
            match (a.is_nan(), b.is_nan()) {
                (true, true) => f64::NAN,
                (true, false) => 0.5 * b,
                (false, true) => 0.5 * a,
                (false, false) => 0.5 * (a + b),
            }
        })
        .collect()
}

fn kt_prime_bin(kt_prime: f64) -> Option<usize> {
    match kt_prime {
        k if (0.0..0.24).contains(&k) => Some(0),
        k if (0.24..0.4).contains(&k) => Some(1),
        k if (0.4..0.56).contains(&k) => Some(2),
        k if (0.56..0.7).contains(&k) => Some(3),
        k if (0.7..0.8).contains(&k) => Some(4),
        k if (0.8..=1.0).contains(&k) => Some(5),
        _ => None,
    }
}

/// Zenith in degrees.
fn zenith_bin(zenith: f64) -> Option<usize> {
    match zenith {
        z if (0.0..25.0).contains(&z) => Some(0),
        z if (25.0..40.0).contains(&z) => Some(1),
        z if (40.0..55.0).contains(&z) => Some(2),
        z if (55.0..70.0).contains(&z) => Some(3),
        z if (70.0..80.0).contains(&z) => Some(4),
        z if z >= 80.0 => Some(5),
        _ => None,
    }
}

fn delta_kt_prime_bin(delta: f64) -> Option<usize> {
    match delta {
        d if (0.0..0.015).contains(&d) => Some(0),
        d if (0.015..0.035).contains(&d) => Some(1),
        d if (0.035..0.07).contains(&d) => Some(2),
        d if (0.07..0.15).contains(&d) => Some(3),
        d if (0.15..0.3).contains(&d) => Some(4),
        d if (0.3..=1.0).contains(&d) => Some(5),
        _ => None,
    }
}

/// Table coefficient for one hour; NaN when any input falls outside its bins.
pub(crate) fn dirint_coefficient(kt_prime: f64, zenith: f64, delta: f64) -> f64 {
    match (
        kt_prime_bin(kt_prime),
        zenith_bin(zenith),
        delta_kt_prime_bin(delta),
    ) {
        (Some(k), Some(z), Some(d)) => DIRINT_COEFFS[k][z][d * 5 + W_BIN_MISSING],
        _ => f64::NAN,
    }
}

/// DIRINT DNI (W/m²) for a contiguous run of hours.
///
/// * `ghi` - global horizontal irradiance per hour, W/m²
/// * `zenith` - solar zenith per hour, degrees
/// * `day_of_year` - calendar day used for extraterrestrial radiation
///
/// Hours whose inputs cannot be binned (typically night) come back as NaN.
pub fn dirint(ghi: &[f64], zenith: &[f64], day_of_year: u32) -> IrradianceResult<Vec<f64>> {
    if ghi.len() != zenith.len() {
        return Err(IrradianceError::LengthMismatch {
            what: "zenith",
            got: zenith.len(),
            expected: ghi.len(),
        });
    }

    let disc_out: Vec<_> = ghi
        .iter()
        .zip(zenith)
        .map(|(&g, &z)| disc(g, z, day_of_year))
        .collect();

    let kt_prime: Vec<f64> = disc_out
        .iter()
        .map(|d| clearness_index_zenith_independent(d.kt, d.airmass))
        .collect();
    let delta = delta_kt_prime(&kt_prime);

    Ok(disc_out
        .iter()
        .enumerate()
        .map(|(i, d)| d.dni * dirint_coefficient(kt_prime[i], zenith[i], delta[i]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::assert_approx_eq;

    #[test]
    fn test_bins_edges() {
        assert_eq!(kt_prime_bin(0.0), Some(0));
        assert_eq!(kt_prime_bin(0.24), Some(1));
        assert_eq!(kt_prime_bin(1.0), Some(5));
        assert_eq!(kt_prime_bin(f64::NAN), None);

        assert_eq!(zenith_bin(24.999), Some(0));
        assert_eq!(zenith_bin(25.0), Some(1));
        assert_eq!(zenith_bin(95.0), Some(5));
        assert_eq!(zenith_bin(-1.0), None);

        assert_eq!(delta_kt_prime_bin(0.0149), Some(0));
        assert_eq!(delta_kt_prime_bin(0.3), Some(5));
        assert_eq!(delta_kt_prime_bin(f64::NAN), None);
    }

    #[test]
    fn test_coefficient_lookup() {
        // First kt', zenith and delta bins, missing precipitable water column
        assert_eq!(dirint_coefficient(0.1, 10.0, 0.0), 0.317440);
        assert_eq!(dirint_coefficient(0.1, 10.0, 0.02), 0.503650);
        assert!(dirint_coefficient(f64::NAN, 10.0, 0.0).is_nan());
    }

    #[test]
    fn test_delta_kt_prime_edges() {
        let d = delta_kt_prime(&[0.2, 0.4, 0.3]);
        assert_approx_eq!(d[0], 0.2, 1e-12);
        assert_approx_eq!(d[1], 0.15, 1e-12);
        assert_approx_eq!(d[2], 0.1, 1e-12);
    }

    #[test]
    fn test_delta_kt_prime_nan_neighbours() {
        let d = delta_kt_prime(&[f64::NAN, 0.4, 0.3, f64::NAN]);
        assert!(d[0].is_nan());
        assert_approx_eq!(d[1], 0.05, 1e-12);
        assert_approx_eq!(d[2], 0.05, 1e-12);
        assert!(d[3].is_nan());

        let single = delta_kt_prime(&[0.5]);
        assert!(single[0].is_nan());
    }

    #[test]
    fn test_kt_prime_factor() {
        let kt_prime = clearness_index_zenith_independent(0.5, 1.0);
        let factor = 1.031 * (-1.4f64 / (0.9 + 9.4)).exp() + 0.1;
        assert_approx_eq!(kt_prime, 0.5 / factor, 1e-12);
        assert!(clearness_index_zenith_independent(0.5, f64::NAN).is_nan());
    }

    #[test]
    fn test_dirint_length_mismatch() {
        let err = dirint(&[1.0, 2.0], &[10.0], 1).unwrap_err();
        assert!(matches!(err, IrradianceError::LengthMismatch { .. }));
    }

    #[test]
    fn test_dirint_night_is_nan_or_zero() {
        let dni = dirint(&[0.0, 0.0], &[110.0, 120.0], 10).unwrap();
        assert!(dni.iter().all(|v| v.is_nan() || *v == 0.0));
    }
}
