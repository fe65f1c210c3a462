//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` defaults and parses CLI arguments
//! - initializes logging
//! - fits curves / runs simulations and prints reports
//! - launches the interactive editor

use std::fs::File;
use std::path::Path;
use std::time::Duration;

use clap::Parser;
use log::LevelFilter;

use crate::cli::{Command, FitArgs, SimulateArgs, TuiArgs};
use crate::error::AppError;
use crate::fit::parse_points;

pub mod pipeline;

/// Entry point for the `pace` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env file is the normal case.
    dotenvy::dotenv().ok();

    // We want `pace` and `pace --scale 2` to behave like `pace tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fit(args) => {
            init_logging(cli.verbose, LogTarget::Stderr)?;
            handle_fit(args)
        }
        Command::Simulate(args) => {
            init_logging(cli.verbose, LogTarget::Stderr)?;
            handle_simulate(args)
        }
        Command::Tui(args) => {
            // The terminal belongs to the UI; only log when a file is given.
            let target = match args.log_file.as_deref() {
                Some(path) => LogTarget::File(path),
                None => LogTarget::Off,
            };
            init_logging(cli.verbose, target)?;
            handle_tui(args)
        }
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let points = parse_points(&args.points)?;
    if !(args.scale.is_finite() && args.scale > 0.0) {
        return Err(AppError::new(
            2,
            format!("polynomial scale must be positive, got {}", args.scale),
        ));
    }

    let run = pipeline::run_fit(points, args.scale)?;

    if args.json {
        println!("{}", crate::report::format_fit_json(&run)?);
        return Ok(());
    }

    println!("{}", crate::report::format_fit_summary(&run));
    if !args.no_plot {
        let plot = crate::plot::render_ascii_plot(&run.points, &run.display, None, args.width, args.height);
        println!("{plot}");
    }
    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let config = args.pace.to_config()?;
    let points = parse_points(&args.pace.points)?;
    if !(args.max_seconds.is_finite() && args.max_seconds > 0.0) {
        return Err(AppError::new(
            2,
            format!("max seconds must be positive, got {}", args.max_seconds),
        ));
    }

    let run = pipeline::run_fit(points, config.scale)?;
    println!("Rate curve: y(x) = {}\n", crate::report::format_polynomial(&run.rate));

    let sim = pipeline::run_simulation(
        &run.rate,
        &config,
        Duration::from_secs_f64(args.max_seconds),
        args.report_every,
    );
    println!("{}", crate::report::format_timeline(&sim));
    Ok(())
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    let config = args.to_config()?;
    let points = parse_points(&args.pace.points)?;
    crate::tui::run(points, config)
}

/// Where log records go.
#[derive(Debug, Clone, Copy)]
enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
    Off,
}

/// Initialize `env_logger` once. `RUST_LOG` overrides the default level.
fn init_logging(verbose: bool, target: LogTarget<'_>) -> Result<(), AppError> {
    let default_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(default_level).parse_default_env();

    match target {
        LogTarget::Stderr => {}
        LogTarget::Off => {
            builder.filter_level(LevelFilter::Off);
        }
        LogTarget::File(path) => {
            let file = File::create(path).map_err(|e| {
                AppError::new(2, format!("Failed to create log file '{}': {e}", path.display()))
            })?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
    }

    // A second init (e.g. from tests) is harmless.
    builder.try_init().ok();
    Ok(())
}

/// Rewrite argv so `pace` defaults to `pace tui`.
///
/// Rules:
/// - `pace`                          -> `pace tui`
/// - `pace -p "0 0, 1 1" ...`        -> `pace tui -p "0 0, 1 1" ...`
/// - `pace --help/--version/-h`      -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "simulate" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_launches_tui() {
        assert_eq!(rewrite_args(args(&["pace"])), args(&["pace", "tui"]));
    }

    #[test]
    fn leading_flags_are_tui_flags() {
        assert_eq!(
            rewrite_args(args(&["pace", "--scale", "2"])),
            args(&["pace", "tui", "--scale", "2"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        let fit = args(&["pace", "fit", "-p", "0 0, 1 1"]);
        assert_eq!(rewrite_args(fit.clone()), fit);
        let help = args(&["pace", "--help"]);
        assert_eq!(rewrite_args(help.clone()), help);
    }
}
