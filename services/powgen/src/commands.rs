//! Sub-command implementations.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use grid_store::OutputGridStore;
use merra_reader::{year_path, DatasetSource, RegionRaster};
use powgen::{
    discover_rasters, discover_years, write_classification, write_region_mask, CellPipeline,
    CommandSimulator, FileJobStateStore, JobStateStore, PowGenConfig, RegionMask, RunOutcome,
    WindClassAggregator,
};
use powgen_common::EnergyKind;
use tracing::{info, warn};

#[cfg(feature = "netcdf")]
fn dataset_source(template: &str) -> Result<Box<dyn DatasetSource>> {
    Ok(Box::new(merra_reader::NetCdfDatasetSource::new(template)))
}

#[cfg(not(feature = "netcdf"))]
fn dataset_source(template: &str) -> Result<Box<dyn DatasetSource>> {
    anyhow::bail!(
        "cannot read {template}: powgen was built without NetCDF support, rebuild with `--features netcdf`"
    )
}

#[cfg(feature = "netcdf")]
fn read_raster(path: &Path) -> Result<RegionRaster> {
    merra_reader::read_region_raster(path)
        .with_context(|| format!("Failed to read region raster {:?}", path))
}

#[cfg(not(feature = "netcdf"))]
fn read_raster(path: &Path) -> Result<RegionRaster> {
    anyhow::bail!(
        "cannot read {path:?}: powgen was built without NetCDF support, rebuild with `--features netcdf`"
    )
}

/// Create (or validate) both output stores for `year`.
pub fn prepare(config: &PowGenConfig, year: i32) -> Result<OutputGridStore> {
    let (lats, lons) = config.grid.coordinates()?;
    fs::create_dir_all(&config.paths.destination).with_context(|| {
        format!(
            "Failed to create output directory {:?}",
            config.paths.destination
        )
    })?;

    let store = OutputGridStore::ensure(
        &config.paths.destination,
        year,
        &lats,
        &lons,
        config.grid.hours_per_year,
        &config.store,
    )
    .with_context(|| format!("Failed to prepare output stores for {year}"))?;

    for kind in EnergyKind::ALL {
        info!(path = %store.path(kind).display(), kind = %kind, "Output store ready");
    }
    Ok(store)
}

/// Resume log path for `year`; `{year}` in the configured path is substituted.
fn resume_log_path(config: &PowGenConfig, year: i32) -> PathBuf {
    PathBuf::from(year_path(&config.paths.resume_log.to_string_lossy(), year))
}

/// Process the next longitude column of `year`.
pub fn run(config: &PowGenConfig, year: i32) -> Result<()> {
    let mut log = FileJobStateStore::new(resume_log_path(config, year));
    let state = log
        .load()
        .with_context(|| format!("Failed to read resume log {:?}", log.path()))?;
    if state.complete {
        info!(year = year, log = %log.path().display(), "Nothing left to do");
        return Ok(());
    }

    let source = dataset_source(&config.paths.dataset)?;
    let dataset = source
        .open_year(year)
        .with_context(|| format!("Failed to open archive for {year}"))?;
    let store = prepare(config, year)?;

    fs::create_dir_all(&config.paths.work_dir).with_context(|| {
        format!("Failed to create work directory {:?}", config.paths.work_dir)
    })?;

    let simulators = &config.simulators;
    let solar = CommandSimulator::new(
        EnergyKind::Solar,
        &simulators.solar.program,
        &config.paths.work_dir,
    )
    .with_args(simulators.solar.args.clone())
    .with_output_scale(config.solar_output_scale());
    let wind = CommandSimulator::new(
        EnergyKind::Wind,
        &simulators.wind.program,
        &config.paths.work_dir,
    )
    .with_args(simulators.wind.args.clone())
    .with_output_scale(config.wind_output_scale());

    let pipeline = CellPipeline::new(&config.grid, dataset.as_ref(), &store, &solar, &wind)?
        .with_system(config.system.clone())
        .with_policy(config.batch);

    match pipeline.run_next_column(&mut log)? {
        RunOutcome::AlreadyComplete => {
            info!(year = year, log = %log.path().display(), "Nothing left to do");
        }
        RunOutcome::Column(summary) => {
            if summary.failed > 0 {
                warn!(
                    year = year,
                    lon_idx = summary.lon_idx,
                    failed = summary.failed,
                    "Column has failed simulations, the next run retries it"
                );
            }
            info!(
                year = year,
                lon_idx = summary.lon_idx,
                cells = summary.cells,
                written = summary.written,
                skipped = summary.skipped,
                "Column finished"
            );
        }
    }
    Ok(())
}

/// Directory scanned for archive years when none are given.
fn search_dir(config: &PowGenConfig) -> PathBuf {
    if let Some(dir) = &config.wind_class.search_dir {
        return dir.clone();
    }
    Path::new(config.wind_class_dataset())
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Average several years of winds into IEC classes and write the spreadsheet.
pub fn wind_class(config: &PowGenConfig, years: Vec<i32>, output: Option<PathBuf>) -> Result<()> {
    let years = if years.is_empty() {
        let dir = search_dir(config);
        let found = discover_years(&dir, &config.wind_class.file_prefix)
            .with_context(|| format!("Failed to scan {dir:?} for archives"))?;
        anyhow::ensure!(!found.is_empty(), "No archives found in {:?}", dir);
        found
    } else {
        years
    };
    info!(years = ?years, "Classifying wind resource");

    let source = dataset_source(config.wind_class_dataset())?;
    let summary = WindClassAggregator::new(&config.grid, source.as_ref()).run(&years)?;

    let target = output.unwrap_or_else(|| config.wind_class.output.clone());
    let written = write_classification(&summary.classes, &target)?;
    info!(path = %written.display(), years = years.len(), "Wind classification complete");
    Ok(())
}

/// Where the region mask comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionSource {
    Raster(PathBuf),
    StateDir(PathBuf),
}

impl RegionSource {
    /// Command-line choice first, then the configuration.
    pub fn resolve(
        config: &PowGenConfig,
        raster: Option<PathBuf>,
        state_dir: Option<PathBuf>,
    ) -> Result<Self> {
        match (raster, state_dir) {
            (Some(_), Some(_)) => anyhow::bail!("Give either a raster or a state directory"),
            (Some(raster), None) => Ok(Self::Raster(raster)),
            (None, Some(dir)) => Ok(Self::StateDir(dir)),
            (None, None) => match (&config.region.raster, &config.region.state_dir) {
                (_, Some(dir)) => Ok(Self::StateDir(dir.clone())),
                (Some(raster), None) => Ok(Self::Raster(raster.clone())),
                (None, None) => anyhow::bail!("No region raster or state directory configured"),
            },
        }
    }

    fn raster_paths(&self) -> Result<Vec<PathBuf>> {
        match self {
            Self::Raster(path) => Ok(vec![path.clone()]),
            Self::StateDir(dir) => {
                let found = discover_rasters(dir)
                    .with_context(|| format!("Failed to scan {dir:?} for rasters"))?;
                anyhow::ensure!(!found.is_empty(), "No rasters found in {:?}", dir);
                Ok(found)
            }
        }
    }
}

/// Build the region mask over the configured grid and write it.
pub fn bounds(config: &PowGenConfig, source: RegionSource, output: Option<PathBuf>) -> Result<()> {
    let (lats, lons) = config.grid.coordinates()?;
    let paths = source.raster_paths()?;
    info!(source = ?source, rasters = paths.len(), "Building region mask");

    let rasters = paths
        .iter()
        .map(|path| read_raster(path))
        .collect::<Result<Vec<_>>>()?;
    let mask = RegionMask::from_rasters(lats, lons, &rasters)?;

    let target = output.unwrap_or_else(|| config.region.output.clone());
    write_region_mask(&mask, &target)?;
    Ok(())
}

/// Print the region coordinates, one per line.
pub fn coords(config: &PowGenConfig) -> Result<()> {
    let (lats, lons) = config.grid.coordinates()?;
    println!("lat ({}):", lats.len());
    for lat in &lats {
        println!("  {lat}");
    }
    println!("lon ({}):", lons.len());
    for lon in &lons {
        println!("  {lon}");
    }
    Ok(())
}
