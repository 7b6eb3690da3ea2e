//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use magcal_core::SensorKind;
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(
    name = "magcal",
    version,
    about = "Generate magnetometer calibration measurements from static intervals"
)]
pub struct Cli {
    /// Path to config TOML (defaults apply when omitted)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print measurements, summaries, logs and errors as JSON lines
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG takes precedence
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Sensor triad to measure; overrides `generator.sensor` from the config.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum SensorArg {
    Flux,
    SpecificForce,
    AngularRate,
}

impl From<SensorArg> for SensorKind {
    fn from(s: SensorArg) -> Self {
        match s {
            SensorArg::Flux => SensorKind::FluxDensity,
            SensorArg::SpecificForce => SensorKind::SpecificForce,
            SensorArg::AngularRate => SensorKind::AngularRate,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a recorded sample CSV through the generator
    Replay {
        /// Sample CSV (timestamp_s,fx,fy,fz,bx,by,bz[,wx,wy,wz])
        #[arg(long, value_name = "FILE")]
        samples: PathBuf,
        #[arg(long, value_enum)]
        sensor: Option<SensorArg>,
    },
    /// Run a simulated static/dynamic session through the generator
    Simulate {
        /// Number of static+dynamic cycles
        #[arg(long, default_value_t = 4)]
        cycles: usize,
        /// Samples per static phase
        #[arg(long, value_name = "N", default_value_t = 150)]
        static_samples: usize,
        /// Samples per dynamic phase
        #[arg(long, value_name = "N", default_value_t = 40)]
        dynamic_samples: usize,
        #[arg(long, value_enum)]
        sensor: Option<SensorArg>,
        /// Noise seed (deterministic per seed)
        #[arg(long)]
        seed: Option<u32>,
    },
    /// Quick health check: build from config and run a short simulated session
    SelfCheck,
}
