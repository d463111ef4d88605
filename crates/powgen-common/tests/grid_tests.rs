//! Integration tests for region addressing.

use powgen_common::{build_coordinates, flat_index, month_day, unflatten_index, GridConfig};

#[test]
fn test_region_cells_map_to_distinct_dataset_indices() {
    let config = GridConfig::default();
    let (lats, lons) = config.coordinates().unwrap();
    assert_eq!(lats.len(), config.num_lats);
    assert_eq!(lons.len(), config.num_lons);

    let mut indices: Vec<usize> = (0..config.num_lats)
        .flat_map(|i| (0..config.num_lons).map(move |j| (i, j)))
        .map(|(i, j)| config.dataset_index(i, j).unwrap())
        .collect();
    indices.sort_unstable();
    indices.dedup();
    assert_eq!(indices.len(), config.cell_count());
    assert_eq!(*indices.last().unwrap(), config.cell_count() - 1);
}

#[test]
fn test_flat_index_roundtrip_large_grid() {
    let num_lons = 576;
    for idx in [0usize, 1, 575, 576, 1_000, 207_359] {
        let (i, j) = unflatten_index(idx, num_lons).unwrap();
        assert_eq!(flat_index(i, j, num_lons).unwrap(), idx);
    }
}

#[test]
fn test_coordinates_match_config_steps() {
    let (lats, lons) = build_coordinates(3, 3, 10.0, 20.0, 0.5, 0.625).unwrap();
    assert_eq!(lats, vec![10.0, 10.5, 11.0]);
    assert_eq!(lons, vec![20.0, 20.625, 21.25]);
}

#[test]
fn test_every_day_of_series_has_a_date() {
    let config = GridConfig::default();
    for day in 1..=config.days_per_year() as i64 {
        assert!(month_day(day).is_ok());
    }
}
