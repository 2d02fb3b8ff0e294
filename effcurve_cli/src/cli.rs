//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "effcurve", version, about = "Motor efficiency-curve bench")]
pub struct Cli {
    /// Path to config TOML (all sections optional)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log and report as JSON lines instead of pretty text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides [logging] level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Output selection shared by `run` and `analyze`.
#[derive(clap::Args, Debug, Default)]
pub struct ExportArgs {
    /// Write the efficiency plot to this PNG (overrides [export] image)
    #[arg(long, value_name = "FILE")]
    pub image: Option<PathBuf>,
    /// Do not write the efficiency plot
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "image")]
    pub no_plot: bool,
    /// Write samples and efficiencies as CSV (overrides [export] csv)
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ramp the motor, sample until a stop condition, fit and export the curve
    Run {
        /// Magnet pole pairs of the motor under test (overrides motor.pole_pairs)
        #[arg(long, value_name = "N")]
        pole_pairs: Option<i64>,
        /// Ramp target duty in (0, 1] (overrides ramp.target_duty)
        #[arg(long, value_name = "DUTY")]
        target_duty: Option<f64>,
        /// Start sampling without waiting for Enter
        #[arg(long, action = ArgAction::SetTrue)]
        no_wait: bool,
        #[command(flatten)]
        export: ExportArgs,
    },
    /// Fit and export the curve of a recorded `current,rpm,voltage` CSV
    Analyze {
        /// Recorded sample log
        #[arg(long, value_name = "FILE")]
        log: PathBuf,
        #[command(flatten)]
        export: ExportArgs,
    },
    /// Validate the config and ping the controller
    SelfCheck,
}
