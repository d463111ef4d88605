//! Integration tests for daily GHI decomposition.

use irradiance::{decompose_day, DayInput};
use test_utils::{assert_approx_eq, diurnal_ghi};

fn input(ghi: &[f64], day: u32) -> DayInput<'_> {
    DayInput {
        latitude: 35.0,
        longitude: -105.0,
        day_of_year: day,
        calendar_day_of_year: day,
        ghi,
    }
}

#[test]
fn test_zero_ghi_gives_zero_dni_and_dhi() {
    let ghi = [0.0; 24];
    for day in [1, 80, 172, 266, 355, 365] {
        let out = decompose_day(input(&ghi, day)).unwrap();
        assert_eq!(out.dni, vec![0.0; 24], "day {}", day);
        assert_eq!(out.dhi, vec![0.0; 24], "day {}", day);
    }
}

#[test]
fn test_clear_day_components_are_consistent() {
    // Daylight at 105W runs roughly 12 UTC to 02 UTC in summer
    let ghi = diurnal_ghi(1, 950.0, 13, 11);
    let out = decompose_day(input(&ghi, 172)).unwrap();

    assert_eq!(out.dni.len(), 24);
    assert!(out.dni.iter().all(|v| v.is_finite() && *v >= 0.0));
    assert!(out.dhi.iter().all(|v| v.is_finite()));

    // Beam component appears around local noon (about 19 UTC)
    assert!(out.dni[19] > 100.0, "dni at 19 UTC {}", out.dni[19]);

    for h in 0..24 {
        let reconstructed = out.dhi[h] + out.dni[h] * out.zenith[h].to_radians().cos();
        assert_approx_eq!(reconstructed, ghi[h], 1e-9);
    }
}

#[test]
fn test_night_hours_have_no_beam() {
    let ghi = diurnal_ghi(1, 800.0, 13, 11);
    let out = decompose_day(input(&ghi, 20)).unwrap();
    for h in 4..10 {
        assert!(out.zenith[h] > 90.0, "hour {} zenith {}", h, out.zenith[h]);
        assert_eq!(out.dni[h], 0.0);
        assert_eq!(out.dhi[h], 0.0);
    }
}

#[test]
fn test_nan_ghi_defaults_to_zero() {
    let mut ghi = diurnal_ghi(1, 800.0, 13, 11);
    ghi[18] = f64::NAN;
    let out = decompose_day(input(&ghi, 172)).unwrap();
    assert_eq!(out.dni[18], 0.0);
    assert_eq!(out.dhi[18], 0.0);
    assert!(out.dni.iter().all(|v| v.is_finite()));
}

#[test]
fn test_leap_year_calendar_day_shifts_extra_radiation() {
    let ghi = diurnal_ghi(1, 900.0, 13, 11);
    let same = decompose_day(input(&ghi, 200)).unwrap();
    let shifted = decompose_day(DayInput {
        calendar_day_of_year: 201,
        ..input(&ghi, 200)
    })
    .unwrap();
    assert_eq!(same.zenith, shifted.zenith);
    assert_ne!(same.dni, shifted.dni);
}
