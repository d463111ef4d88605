//! powgen command-line driver.
//!
//! Each `run` invocation processes one longitude column of one year and
//! records it in the resume log, so a region is covered by repeated runs
//! (or by independent jobs working on disjoint columns).

mod commands;
mod config_loader;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use config_loader::load_config;

#[derive(Parser, Debug)]
#[command(name = "powgen")]
#[command(about = "Hourly solar and wind generation grids from reanalysis data")]
struct Args {
    /// Log level, used when RUST_LOG is unset
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process the next longitude column recorded in the resume log
    Run {
        /// Configuration file path
        #[arg(short, long, env = "POWGEN_CONFIG", default_value = "config/powgen.yaml")]
        config: PathBuf,

        /// Year to process
        #[arg(short, long)]
        year: i32,
    },

    /// Build the IEC wind-class spreadsheet
    WindClass {
        /// Configuration file path
        #[arg(short, long, env = "POWGEN_CONFIG", default_value = "config/powgen.yaml")]
        config: PathBuf,

        /// Years to average (discovered from the archive directory when omitted)
        #[arg(long, value_delimiter = ',')]
        years: Vec<i32>,

        /// Spreadsheet path, overriding the configuration
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create the output stores for a year without processing any cell
    Prepare {
        /// Configuration file path
        #[arg(short, long, env = "POWGEN_CONFIG", default_value = "config/powgen.yaml")]
        config: PathBuf,

        /// Year to prepare
        #[arg(short, long)]
        year: i32,
    },

    /// Mark which grid points fall inside a region raster
    Bounds {
        /// Configuration file path
        #[arg(short, long, env = "POWGEN_CONFIG", default_value = "config/powgen.yaml")]
        config: PathBuf,

        /// Region raster, overriding the configuration
        #[arg(long, conflicts_with = "state_dir")]
        raster: Option<PathBuf>,

        /// Directory of per-state rasters to sum, overriding the configuration
        #[arg(long)]
        state_dir: Option<PathBuf>,

        /// Spreadsheet path, overriding the configuration
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the region's latitude and longitude coordinates
    Coords {
        /// Configuration file path
        #[arg(short, long, env = "POWGEN_CONFIG", default_value = "config/powgen.yaml")]
        config: PathBuf,
    },
}

fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .json()
            .init(),
        LogFormat::Text => fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_level(true)
            .compact()
            .init(),
    }
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.log_format);

    match args.command {
        Command::Run { config, year } => {
            info!(config = %config.display(), year = year, "Starting generation run");
            let config = load_config(&config)?;
            commands::run(&config, year)
        }
        Command::WindClass {
            config,
            years,
            output,
        } => {
            info!(config = %config.display(), "Starting wind classification");
            let config = load_config(&config)?;
            commands::wind_class(&config, years, output)
        }
        Command::Prepare { config, year } => {
            let config = load_config(&config)?;
            commands::prepare(&config, year).map(|_| ())
        }
        Command::Bounds {
            config,
            raster,
            state_dir,
            output,
        } => {
            info!(config = %config.display(), "Starting region mask");
            let config = load_config(&config)?;
            let source = commands::RegionSource::resolve(&config, raster, state_dir)?;
            commands::bounds(&config, source, output)
        }
        Command::Coords { config } => {
            let config = load_config(&config)?;
            commands::coords(&config)
        }
    }
}
