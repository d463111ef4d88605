//! Integration test: create output stores, write cells, read them back.

use grid_store::{store_exists, OutputGridStore, StoreConfig, StoreError, ZarrCompression};
use powgen_common::{build_coordinates, EnergyKind};
use tempfile::TempDir;
use test_utils::{mixed_sign_series, seasonal_temperature_kelvin, HOURS_PER_YEAR};

fn region() -> (Vec<f64>, Vec<f64>) {
    build_coordinates(3, 2, 31.5, -125.0, 0.5, 0.625).unwrap()
}

#[test]
fn test_cell_roundtrip_is_bit_exact() {
    let dir = TempDir::new().unwrap();
    let (lats, lons) = region();
    let store = OutputGridStore::ensure(
        dir.path(),
        2018,
        &lats,
        &lons,
        HOURS_PER_YEAR,
        &StoreConfig::default(),
    )
    .unwrap();

    // Celsius temperatures: zeros, negatives and fractions
    let series: Vec<f64> = seasonal_temperature_kelvin(HOURS_PER_YEAR)
        .iter()
        .map(|k| k - 273.15)
        .collect();
    assert!(series.iter().any(|v| *v < 0.0));

    store.write_cell(EnergyKind::Solar, 2, 1, &series).unwrap();
    let back = store.read_cell(EnergyKind::Solar, 2, 1).unwrap();

    assert_eq!(back.len(), series.len());
    for (a, b) in series.iter().zip(&back) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
}

#[test]
fn test_roundtrip_uncompressed_and_lz4() {
    for compression in [ZarrCompression::None, ZarrCompression::BloscLz4] {
        let dir = TempDir::new().unwrap();
        let (lats, lons) = region();
        let config = StoreConfig {
            compression,
            ..StoreConfig::default()
        };
        let store =
            OutputGridStore::ensure(dir.path(), 2017, &lats, &lons, HOURS_PER_YEAR, &config)
                .unwrap();

        let series = mixed_sign_series(HOURS_PER_YEAR);
        assert!(series.contains(&0.0));
        store.write_cell(EnergyKind::Wind, 0, 0, &series).unwrap();
        assert_eq!(store.read_cell(EnergyKind::Wind, 0, 0).unwrap(), series);
    }
}

#[test]
fn test_unwritten_cells_are_placeholders() {
    let dir = TempDir::new().unwrap();
    let (lats, lons) = region();
    let store =
        OutputGridStore::ensure(dir.path(), 2018, &lats, &lons, 48, &StoreConfig::default())
            .unwrap();

    assert!(!store.is_cell_written(EnergyKind::Wind, 1, 1).unwrap());
    assert!(store
        .read_cell(EnergyKind::Wind, 1, 1)
        .unwrap()
        .iter()
        .all(|v| v.is_nan()));

    store
        .write_cell(EnergyKind::Wind, 1, 1, &vec![0.25; 48])
        .unwrap();
    assert!(store.is_cell_written(EnergyKind::Wind, 1, 1).unwrap());
    // The other kind's store is untouched
    assert!(!store.is_cell_written(EnergyKind::Solar, 1, 1).unwrap());
}

#[test]
fn test_second_write_is_a_conflict() {
    let dir = TempDir::new().unwrap();
    let (lats, lons) = region();
    let store =
        OutputGridStore::ensure(dir.path(), 2018, &lats, &lons, 24, &StoreConfig::default())
            .unwrap();

    store
        .write_cell(EnergyKind::Solar, 0, 1, &vec![1.0; 24])
        .unwrap();
    let err = store
        .write_cell(EnergyKind::Solar, 0, 1, &vec![2.0; 24])
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::OutputStoreWriteConflict {
            kind: EnergyKind::Solar,
            lat_idx: 0,
            lon_idx: 1
        }
    ));
    assert_eq!(
        store.read_cell(EnergyKind::Solar, 0, 1).unwrap(),
        vec![1.0; 24]
    );
}

#[test]
fn test_ensure_is_idempotent_and_preserves_data() {
    let dir = TempDir::new().unwrap();
    let (lats, lons) = region();
    let config = StoreConfig::default();

    let store = OutputGridStore::ensure(dir.path(), 2016, &lats, &lons, 24, &config).unwrap();
    assert!(store_exists(&store.path(EnergyKind::Solar)));
    assert!(store_exists(&store.path(EnergyKind::Wind)));
    store
        .write_cell(EnergyKind::Solar, 1, 0, &vec![3.5; 24])
        .unwrap();

    let again = OutputGridStore::ensure(dir.path(), 2016, &lats, &lons, 24, &config).unwrap();
    assert_eq!(
        again.read_cell(EnergyKind::Solar, 1, 0).unwrap(),
        vec![3.5; 24]
    );

    let reopened = OutputGridStore::open(dir.path(), 2016).unwrap();
    assert_eq!(reopened.shape(), (3, 2, 24));
}

#[test]
fn test_ensure_rejects_mismatched_existing_store() {
    let dir = TempDir::new().unwrap();
    let (lats, lons) = region();
    let config = StoreConfig::default();
    OutputGridStore::ensure(dir.path(), 2016, &lats, &lons, 24, &config).unwrap();

    let err = OutputGridStore::ensure(dir.path(), 2016, &lats, &lons, 48, &config).unwrap_err();
    assert!(matches!(err, StoreError::InvalidDimension(_)));
}

#[test]
fn test_coordinate_side_arrays() {
    let dir = TempDir::new().unwrap();
    let (lats, lons) = region();
    let store =
        OutputGridStore::ensure(dir.path(), 2018, &lats, &lons, 24, &StoreConfig::default())
            .unwrap();

    for kind in EnergyKind::ALL {
        let (l, n) = store.coordinates(kind).unwrap();
        assert_eq!(l, lats);
        assert_eq!(n, lons);
    }
}

#[test]
fn test_all_nan_series_counts_as_written() {
    let dir = TempDir::new().unwrap();
    let (lats, lons) = region();
    let store =
        OutputGridStore::ensure(dir.path(), 2018, &lats, &lons, 4, &StoreConfig::uncompressed())
            .unwrap();

    store
        .write_cell(EnergyKind::Solar, 0, 0, &[f64::NAN; 4])
        .unwrap();
    assert!(store.is_cell_written(EnergyKind::Solar, 0, 0).unwrap());

    let err = store
        .write_cell(EnergyKind::Solar, 0, 0, &[1.0, 2.0, 3.0, 4.0])
        .unwrap_err();
    assert!(matches!(err, StoreError::OutputStoreWriteConflict { .. }));
    assert!(store
        .read_cell(EnergyKind::Solar, 0, 0)
        .unwrap()
        .iter()
        .all(|v| v.is_nan()));

    // Neighbouring cells keep their own markers
    assert!(!store.is_cell_written(EnergyKind::Solar, 0, 1).unwrap());
    assert!(!store.is_cell_written(EnergyKind::Wind, 0, 0).unwrap());
}
