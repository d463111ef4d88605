//! Per-cell generation pipeline.
//!
//! For each cell: extract the raw series, derive simulator inputs, split
//! GHI, run both simulators and write the results into the year's output
//! stores. One invocation handles one longitude column.

use std::time::Instant;

use grid_store::OutputGridStore;
use merra_reader::{extract_raw_bundle, RawResourceBundle, ResourceDataset};
use powgen_common::{EnergyKind, GridConfig, GridError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::derived::{decompose_irradiance, derive_bundle};
use crate::error::{PowGenError, Result};
use crate::resume::{JobState, JobStateStore};
use crate::simulate::{CellResources, Simulator, SystemConfig};

/// How the batch reacts to failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchPolicy {
    /// Log and skip a cell whose simulator fails instead of aborting
    pub continue_on_simulation_failure: bool,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            continue_on_simulation_failure: true,
        }
    }
}

/// What happened to one cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellOutcome {
    pub lat_idx: usize,
    pub lon_idx: usize,
    pub written: Vec<EnergyKind>,
    /// Already present in the store
    pub skipped: Vec<EnergyKind>,
    pub failed: Vec<EnergyKind>,
}

/// Totals for one longitude column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSummary {
    pub lon_idx: usize,
    pub cells: usize,
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ColumnSummary {
    fn add(&mut self, cell: &CellOutcome) {
        self.cells += 1;
        self.written += cell.written.len();
        self.skipped += cell.skipped.len();
        self.failed += cell.failed.len();
    }
}

/// Result of a resume-aware run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Every column was already processed; nothing was done
    AlreadyComplete,
    Column(ColumnSummary),
}

/// Generation pipeline for one year of one region.
pub struct CellPipeline<'a> {
    grid: &'a GridConfig,
    dataset: &'a dyn ResourceDataset,
    store: &'a OutputGridStore,
    solar: &'a dyn Simulator,
    wind: &'a dyn Simulator,
    system: SystemConfig,
    policy: BatchPolicy,
    lats: Vec<f64>,
    lons: Vec<f64>,
}

impl<'a> CellPipeline<'a> {
    pub fn new(
        grid: &'a GridConfig,
        dataset: &'a dyn ResourceDataset,
        store: &'a OutputGridStore,
        solar: &'a dyn Simulator,
        wind: &'a dyn Simulator,
    ) -> Result<Self> {
        if solar.kind() != EnergyKind::Solar || wind.kind() != EnergyKind::Wind {
            return Err(PowGenError::Config(format!(
                "simulators supplied as solar={} wind={}",
                solar.kind(),
                wind.kind()
            )));
        }

        let (lats, lons) = grid.coordinates()?;
        let expected = (lats.len(), lons.len(), grid.hours_per_year);
        if store.shape() != expected {
            return Err(PowGenError::invalid_dimension(format!(
                "store shape {:?} does not match grid {:?}",
                store.shape(),
                expected
            )));
        }

        Ok(Self {
            grid,
            dataset,
            store,
            solar,
            wind,
            system: SystemConfig::default(),
            policy: BatchPolicy::default(),
            lats,
            lons,
        })
    }

    pub fn with_system(mut self, system: SystemConfig) -> Self {
        self.system = system;
        self
    }

    pub fn with_policy(mut self, policy: BatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn year(&self) -> i32 {
        self.store.year()
    }

    /// Simulate and store one cell. Kinds already in the store are skipped.
    pub fn process_cell(&self, lat_idx: usize, lon_idx: usize) -> Result<CellOutcome> {
        let latitude = *self.lats.get(lat_idx).ok_or(GridError::IndexOutOfRange {
            index: lat_idx,
            limit: self.lats.len(),
        })?;
        let longitude = *self.lons.get(lon_idx).ok_or(GridError::IndexOutOfRange {
            index: lon_idx,
            limit: self.lons.len(),
        })?;

        let mut outcome = CellOutcome {
            lat_idx,
            lon_idx,
            ..Default::default()
        };

        let mut pending = Vec::new();
        for simulator in [self.solar, self.wind] {
            if self.store.is_cell_written(simulator.kind(), lat_idx, lon_idx)? {
                debug!(
                    lat = latitude,
                    lon = longitude,
                    kind = %simulator.kind(),
                    "Cell already written, skipping"
                );
                outcome.skipped.push(simulator.kind());
            } else {
                pending.push(simulator);
            }
        }
        if pending.is_empty() {
            return Ok(outcome);
        }

        let start = Instant::now();
        let year = self.year();
        let index = self.grid.dataset_index(lat_idx, lon_idx)?;
        let raw = fit_bundle(extract_raw_bundle(self.dataset, index)?, self.grid.hours_per_year)?;
        let bundle = derive_bundle(&raw)?;
        let solar_days = if pending.iter().any(|s| s.kind() == EnergyKind::Solar) {
            decompose_irradiance(year, latitude, longitude, &bundle.ghi)?
        } else {
            Vec::new()
        };

        let resources = CellResources {
            year,
            latitude,
            longitude,
            bundle: &bundle,
            solar_days: &solar_days,
        };

        for simulator in pending {
            let kind = simulator.kind();
            let result = simulator
                .simulate(&resources, &self.system)
                .and_then(|output| {
                    if output.ac.len() < self.grid.hours_per_year {
                        Err(PowGenError::simulation(
                            kind,
                            format!(
                                "produced {} hours, expected {}",
                                output.ac.len(),
                                self.grid.hours_per_year
                            ),
                        ))
                    } else {
                        Ok(output)
                    }
                });
            match result {
                Ok(output) => {
                    let ac = fit_series(output.ac, self.grid.hours_per_year, kind.as_str())?;
                    self.store.write_cell(kind, lat_idx, lon_idx, &ac)?;
                    if let Some(cf) = output.capacity_factor {
                        info!(
                            lat = latitude,
                            lon = longitude,
                            kind = %kind,
                            capacity_factor = cf,
                            "Capacity factor"
                        );
                    }
                    outcome.written.push(kind);
                }
                Err(e @ PowGenError::SimulationInvocationFailure { .. })
                    if self.policy.continue_on_simulation_failure =>
                {
                    warn!(
                        lat = latitude,
                        lon = longitude,
                        lat_idx = lat_idx,
                        lon_idx = lon_idx,
                        kind = %kind,
                        error = %e,
                        "Simulation failed, skipping cell"
                    );
                    outcome.failed.push(kind);
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            year = year,
            lat = latitude,
            lon = longitude,
            written = outcome.written.len(),
            failed = outcome.failed.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Cell complete"
        );
        Ok(outcome)
    }

    /// Process every latitude of one longitude column.
    pub fn run_column(&self, lon_idx: usize) -> Result<ColumnSummary> {
        let start = Instant::now();
        let mut summary = ColumnSummary {
            lon_idx,
            ..Default::default()
        };

        for lat_idx in 0..self.lats.len() {
            let cell = self.process_cell(lat_idx, lon_idx)?;
            summary.add(&cell);
        }

        info!(
            year = self.year(),
            lon_idx = lon_idx,
            lon = self.lons.get(lon_idx).copied().unwrap_or(f64::NAN),
            cells = summary.cells,
            written = summary.written,
            skipped = summary.skipped,
            failed = summary.failed,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Column complete"
        );
        Ok(summary)
    }

    /// Process the column after the last completed one and record progress.
    ///
    /// A column with failed cells is not recorded, so the next run re-enters
    /// it and only the missing kinds are simulated again.
    pub fn run_next_column(&self, state_store: &mut dyn JobStateStore) -> Result<RunOutcome> {
        let state: JobState = state_store.load()?;
        if state.complete {
            info!(year = self.year(), "All columns already processed");
            return Ok(RunOutcome::AlreadyComplete);
        }

        let lon_idx = state.next_index();
        if lon_idx >= self.lons.len() {
            warn!(
                lon_idx = lon_idx,
                num_lons = self.lons.len(),
                "Resume log points past the last column, treating run as complete"
            );
            return Ok(RunOutcome::AlreadyComplete);
        }

        let summary = self.run_column(lon_idx)?;
        if summary.failed > 0 {
            warn!(
                year = self.year(),
                lon_idx = lon_idx,
                failed = summary.failed,
                "Column incomplete, leaving it unrecorded for the next run"
            );
        } else {
            state_store.record(&state.after_column(lon_idx, self.lons.len()))?;
        }
        Ok(RunOutcome::Column(summary))
    }
}

/// Trim a series to `hours`; shorter series are an error.
fn fit_series(mut series: Vec<f64>, hours: usize, what: &str) -> Result<Vec<f64>> {
    if series.len() < hours {
        return Err(PowGenError::invalid_dimension(format!(
            "{what} series has {} hours, expected {hours}",
            series.len()
        )));
    }
    if series.len() > hours {
        debug!(what = what, len = series.len(), hours = hours, "Truncating series");
        series.truncate(hours);
    }
    Ok(series)
}

fn fit_bundle(raw: RawResourceBundle, hours: usize) -> Result<RawResourceBundle> {
    Ok(RawResourceBundle {
        ghi: fit_series(raw.ghi, hours, "SWGDN")?,
        u2m: fit_series(raw.u2m, hours, "U2M")?,
        v2m: fit_series(raw.v2m, hours, "V2M")?,
        u10m: fit_series(raw.u10m, hours, "U10M")?,
        v10m: fit_series(raw.v10m, hours, "V10M")?,
        u50m: fit_series(raw.u50m, hours, "U50M")?,
        v50m: fit_series(raw.v50m, hours, "V50M")?,
        t2m: fit_series(raw.t2m, hours, "T2M")?,
        ps: fit_series(raw.ps, hours, "PS")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_series() {
        assert_eq!(fit_series(vec![1.0, 2.0, 3.0], 2, "x").unwrap(), vec![1.0, 2.0]);
        assert_eq!(fit_series(vec![1.0, 2.0], 2, "x").unwrap(), vec![1.0, 2.0]);
        assert!(matches!(
            fit_series(vec![1.0], 2, "x"),
            Err(PowGenError::InvalidDimension(_))
        ));
    }

    #[test]
    fn test_default_policy_continues() {
        assert!(BatchPolicy::default().continue_on_simulation_failure);
    }

    #[test]
    fn test_column_summary_totals() {
        let mut summary = ColumnSummary::default();
        summary.add(&CellOutcome {
            written: vec![EnergyKind::Solar],
            failed: vec![EnergyKind::Wind],
            ..Default::default()
        });
        summary.add(&CellOutcome {
            skipped: vec![EnergyKind::Solar, EnergyKind::Wind],
            ..Default::default()
        });
        assert_eq!(summary.cells, 2);
        assert_eq!(summary.written, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.failed, 1);
    }
}
