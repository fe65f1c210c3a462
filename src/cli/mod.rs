//! Command-line parsing for the curve pace editor.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fitting/progress code.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DragModel, PaceConfig, SocketStrategy};
use crate::error::AppError;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "pace",
    version,
    about = "Sketch an interpolating polynomial and use it as a velocity profile"
)]
pub struct Cli {
    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a polynomial through the given points and print its coefficients.
    Fit(FitArgs),
    /// Run the progress controller headlessly against a fitted curve.
    Simulate(SimulateArgs),
    /// Launch the interactive curve editor.
    Tui(TuiArgs),
}

/// Options shared by every command that builds a curve and drives progress.
#[derive(Debug, Args, Clone)]
pub struct PaceArgs {
    /// Control points, e.g. "0 0, 0.5 0.8, 1 1" (defaults to the identity line).
    #[arg(short, long, env = "PACE_POINTS", default_value = "")]
    pub points: String,

    /// Uniform rescale of both axes before fitting the rate curve.
    #[arg(long, env = "PACE_SCALE", default_value_t = 1.0)]
    pub scale: f64,

    /// Progress fraction per second at speed factor 1.
    #[arg(long, env = "PACE_BASE_SPEED", default_value_t = 0.1)]
    pub base_speed: f64,

    /// Smallest speed factor fed back from the curve (must be > 0).
    #[arg(long, env = "PACE_RATE_FLOOR", default_value_t = 0.001)]
    pub rate_floor: f64,

    /// Largest speed factor fed back from the curve.
    #[arg(long, env = "PACE_RATE_CEILING", default_value_t = 1.0)]
    pub rate_ceiling: f64,

    /// Driver cadence in milliseconds.
    #[arg(long, env = "PACE_TICK_MS", default_value_t = 16)]
    pub tick_ms: u64,
}

/// Options for `pace fit`.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Control points, e.g. "0 0, 0.5 0.8, 1 1" (defaults to the identity line).
    #[arg(short, long, env = "PACE_POINTS", default_value = "")]
    pub points: String,

    /// Uniform rescale of both axes before fitting the rate curve.
    #[arg(long, env = "PACE_SCALE", default_value_t = 1.0)]
    pub scale: f64,

    /// Print JSON instead of the text summary.
    #[arg(long)]
    pub json: bool,

    /// Disable the ASCII plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Options for `pace simulate`.
#[derive(Debug, Args, Clone)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub pace: PaceArgs,

    /// Print one timeline row every N ticks.
    #[arg(long, default_value_t = 60)]
    pub report_every: usize,

    /// Stop after this many simulated seconds.
    #[arg(long, default_value_t = 600.0)]
    pub max_seconds: f64,
}

/// Options for `pace tui`.
#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub pace: PaceArgs,

    /// How a right click on empty surface places a new point.
    #[arg(long, value_enum, env = "PACE_SOCKET_STRATEGY", default_value_t = SocketStrategy::PointToCurve)]
    pub socket_strategy: SocketStrategy,

    /// How dragging moves the active point.
    #[arg(long, value_enum, env = "PACE_DRAG_MODEL", default_value_t = DragModel::Relative)]
    pub drag_model: DragModel,

    /// Write logs to this file (the terminal is owned by the UI).
    #[arg(long, env = "PACE_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl PaceArgs {
    /// Build a validated configuration from the shared flags.
    pub fn to_config(&self) -> Result<PaceConfig, AppError> {
        PaceConfig {
            base_speed: self.base_speed,
            rate_floor: self.rate_floor,
            rate_ceiling: self.rate_ceiling,
            tick: Duration::from_millis(self.tick_ms),
            scale: self.scale,
            ..PaceConfig::default()
        }
        .validate()
    }
}

impl TuiArgs {
    pub fn to_config(&self) -> Result<PaceConfig, AppError> {
        Ok(PaceConfig {
            socket_strategy: self.socket_strategy,
            drag_model: self.drag_model,
            ..self.pace.to_config()?
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tui_flags_build_config() {
        let cli = Cli::parse_from([
            "pace",
            "tui",
            "--rate-floor",
            "0.01",
            "--drag-model",
            "absolute",
            "--socket-strategy",
            "curve-to-point",
        ]);
        let Command::Tui(args) = cli.command else {
            panic!("expected tui command");
        };
        let config = args.to_config().unwrap();
        assert_eq!(config.rate_floor, 0.01);
        assert_eq!(config.drag_model, DragModel::Absolute);
        assert_eq!(config.socket_strategy, SocketStrategy::CurveToPoint);
    }

    #[test]
    fn zero_floor_is_a_usage_error() {
        let cli = Cli::parse_from(["pace", "simulate", "--rate-floor", "0"]);
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate command");
        };
        assert_eq!(args.pace.to_config().unwrap_err().exit_code(), 2);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
