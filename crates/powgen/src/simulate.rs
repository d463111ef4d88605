//! Simulator interface and the external-command adapter.

use std::path::PathBuf;
use std::process::Command;

use powgen_common::EnergyKind;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::derived::{DerivedResourceBundle, SolarDay};
use crate::error::{PowGenError, Result};
use crate::resource_file::ResourceFile;

/// Default nameplate capacity, kW.
pub const DEFAULT_CAPACITY_KW: f64 = 1000.0;

/// Default wind turbine hub height, m.
pub const DEFAULT_HUB_HEIGHT_M: f64 = 80.0;

/// Fixed system parameters passed to every simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub capacity_kw: f64,
    pub hub_height_m: f64,
    /// Wind resource model selector understood by the wind simulator
    pub resource_model: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            capacity_kw: DEFAULT_CAPACITY_KW,
            hub_height_m: DEFAULT_HUB_HEIGHT_M,
            resource_model: 0,
        }
    }
}

/// Everything a simulator may need about one cell.
#[derive(Debug, Clone, Copy)]
pub struct CellResources<'a> {
    pub year: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub bundle: &'a DerivedResourceBundle,
    pub solar_days: &'a [SolarDay],
}

/// Hourly AC generation plus the simulator's summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutput {
    pub ac: Vec<f64>,
    pub capacity_factor: Option<f64>,
}

/// Turns one cell's resources into an hourly generation series.
pub trait Simulator {
    fn kind(&self) -> EnergyKind;

    fn simulate(
        &self,
        resources: &CellResources<'_>,
        system: &SystemConfig,
    ) -> Result<SimulationOutput>;
}

/// Runs an external simulator program on a resource file.
///
/// The program receives its configured arguments followed by the resource
/// file path, plus the system parameters in `POWGEN_*` environment
/// variables. Standard output carries one generation value per line;
/// a `capacity_factor=<value>` line is reported separately. Values are
/// multiplied by `output_scale`.
#[derive(Debug, Clone)]
pub struct CommandSimulator {
    kind: EnergyKind,
    program: String,
    args: Vec<String>,
    work_dir: PathBuf,
    output_scale: f64,
}

impl CommandSimulator {
    pub fn new(
        kind: EnergyKind,
        program: impl Into<String>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            kind,
            program: program.into(),
            args: Vec::new(),
            work_dir: work_dir.into(),
            output_scale: 1.0,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_output_scale(mut self, scale: f64) -> Self {
        self.output_scale = scale;
        self
    }

    fn write_resource(&self, resources: &CellResources<'_>) -> Result<ResourceFile> {
        match self.kind {
            EnergyKind::Solar => ResourceFile::create_solar(
                &self.work_dir,
                resources.year,
                resources.latitude,
                resources.longitude,
                resources.solar_days,
                resources.bundle,
            ),
            EnergyKind::Wind => ResourceFile::create_wind(
                &self.work_dir,
                resources.year,
                resources.latitude,
                resources.longitude,
                resources.bundle,
            ),
        }
    }
}

impl Simulator for CommandSimulator {
    fn kind(&self) -> EnergyKind {
        self.kind
    }

    fn simulate(
        &self,
        resources: &CellResources<'_>,
        system: &SystemConfig,
    ) -> Result<SimulationOutput> {
        let resource = self.write_resource(resources)?;

        debug!(
            program = %self.program,
            kind = %self.kind,
            path = %resource.path().display(),
            "Invoking simulator"
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(resource.path())
            .env("POWGEN_RESOURCE_FILE", resource.path())
            .env("POWGEN_ENERGY_KIND", self.kind.as_str())
            .env("POWGEN_SYSTEM_CAPACITY_KW", system.capacity_kw.to_string())
            .env("POWGEN_HUB_HEIGHT_M", system.hub_height_m.to_string())
            .env("POWGEN_RESOURCE_MODEL", system.resource_model.to_string())
            .output()
            .map_err(|e| {
                PowGenError::simulation(self.kind, format!("cannot run {}: {e}", self.program))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PowGenError::simulation(
                self.kind,
                format!(
                    "{} exited with {}: {}",
                    self.program,
                    output.status,
                    stderr.trim()
                ),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let parsed = parse_simulator_output(self.kind, &stdout, self.output_scale)?;
        if parsed.ac.is_empty() {
            warn!(program = %self.program, kind = %self.kind, "Simulator produced no values");
        }
        Ok(parsed)
    }
}

/// Parse simulator stdout: one value per line, blank lines ignored,
/// `capacity_factor=<value>` reported unscaled.
pub fn parse_simulator_output(
    kind: EnergyKind,
    stdout: &str,
    scale: f64,
) -> Result<SimulationOutput> {
    let mut ac = Vec::new();
    let mut capacity_factor = None;

    for (line_no, line) in stdout.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(cf) = line.strip_prefix("capacity_factor=") {
            let value = cf.trim().parse::<f64>().map_err(|e| {
                PowGenError::simulation(kind, format!("bad capacity factor {cf:?}: {e}"))
            })?;
            capacity_factor = Some(value);
            continue;
        }
        let value = line.parse::<f64>().map_err(|e| {
            PowGenError::simulation(
                kind,
                format!("line {}: cannot parse {line:?}: {e}", line_no + 1),
            )
        })?;
        ac.push(value * scale);
    }

    Ok(SimulationOutput {
        ac,
        capacity_factor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::assert_approx_eq;

    #[test]
    fn test_system_defaults() {
        let system = SystemConfig::default();
        assert_eq!(system.capacity_kw, 1000.0);
        assert_eq!(system.hub_height_m, 80.0);
        assert_eq!(system.resource_model, 0);
    }

    #[test]
    fn test_parse_output_scales_values() {
        let out = parse_simulator_output(EnergyKind::Wind, "1000\n\n2500.5\n0\n", 1e-3).unwrap();
        assert_eq!(out.ac.len(), 3);
        assert_approx_eq!(out.ac[0], 1.0, 1e-12);
        assert_approx_eq!(out.ac[1], 2.5005, 1e-12);
        assert_eq!(out.ac[2], 0.0);
        assert_eq!(out.capacity_factor, None);
    }

    #[test]
    fn test_parse_output_capacity_factor() {
        let out =
            parse_simulator_output(EnergyKind::Wind, "capacity_factor=34.5\n1\n2\n", 1.0).unwrap();
        assert_eq!(out.ac, vec![1.0, 2.0]);
        assert_eq!(out.capacity_factor, Some(34.5));
    }

    #[test]
    fn test_parse_output_rejects_garbage() {
        let err = parse_simulator_output(EnergyKind::Solar, "1\nabc\n", 1.0).unwrap_err();
        match err {
            PowGenError::SimulationInvocationFailure { kind, message } => {
                assert_eq!(kind, EnergyKind::Solar);
                assert!(message.contains("line 2"), "{message}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_missing_program_is_invocation_failure() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = DerivedResourceBundle {
            ghi: vec![0.0; 2],
            speed_2m: vec![1.0; 2],
            speed_10m: vec![1.0; 2],
            speed_50m: vec![1.0; 2],
            direction_50m: vec![0.0; 2],
            pressure_atm: vec![1.0; 2],
            temperature_c: vec![10.0; 2],
        };
        let resources = CellResources {
            year: 2018,
            latitude: 31.5,
            longitude: -125.0,
            bundle: &bundle,
            solar_days: &[],
        };
        let sim = CommandSimulator::new(
            EnergyKind::Wind,
            "/nonexistent/powgen-wind-simulator",
            dir.path(),
        );

        let err = sim.simulate(&resources, &SystemConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            PowGenError::SimulationInvocationFailure {
                kind: EnergyKind::Wind,
                ..
            }
        ));
        // The resource file does not outlive the call
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
