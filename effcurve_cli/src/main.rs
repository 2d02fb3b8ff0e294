#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! `effcurve`: measure a motor's efficiency curve on the bench.

mod cli;
mod error_fmt;
mod measure;
mod plot;
mod trigger;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use effcurve_core::{CurveError, RunParams};
use eyre::{Result, WrapErr};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let json = cli.json;
    let _ = JSON_MODE.set(json);
    if !json {
        let _ = color_eyre::install();
    }

    let code = match real_main(cli) {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!(error = ?e, "command failed");
            if JSON_MODE.get().copied().unwrap_or(false) {
                println!("{}", format_error_json(&e));
            } else {
                eprintln!("{}", humanize(&e));
            }
            exit_code_for_error(&e)
        }
    };
    std::process::exit(code);
}

fn real_main(cli: Cli) -> Result<()> {
    let mut cfg = load_config(cli.config.as_deref())?;
    // Held until the command finishes so the file writer flushes.
    let _file_guard = init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&shutdown);
        if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
            tracing::warn!(error = %e, "failed to install Ctrl-C handler");
        }
    }

    match cli.cmd {
        Commands::Run {
            pole_pairs,
            target_duty,
            no_wait,
            export,
        } => {
            // CLI flags override config; the merged result is validated again.
            if pole_pairs.is_some() {
                cfg.motor.pole_pairs = pole_pairs;
            }
            if let Some(d) = target_duty {
                cfg.ramp.target_duty = d;
            }
            validate(&cfg)?;
            let params = RunParams::try_from(&cfg)?;
            let exporters = measure::exporters(&cfg.export, &export);
            let report = measure::run_measurement(params, no_wait, exporters, shutdown)?;
            if cli.json {
                println!("{}", measure::report_json(&report));
            } else {
                measure::print_report(&report);
            }
        }
        Commands::Analyze { log, export } => {
            let exporters = measure::exporters(&cfg.export, &export);
            let (curve, skipped, export_errors) = measure::run_analysis(&log, &exporters)?;
            if cli.json {
                println!(
                    "{}",
                    measure::curve_json(&curve, skipped.as_ref(), &export_errors)
                );
            } else {
                println!("Analyzed {} samples from {:?}", curve.samples.len(), log);
                measure::print_curve(&curve, skipped.as_ref(), &export_errors);
            }
        }
        Commands::SelfCheck => {
            let pole_pairs = cfg.motor.pole_pairs;
            let answered = measure::self_check()?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({ "ok": true, "telemetry": answered, "pole_pairs": pole_pairs })
                );
            } else {
                if answered {
                    println!("OK: config valid, controller answered");
                } else {
                    println!("OK: config valid, controller reachable but sent no telemetry");
                }
                if pole_pairs.is_none() {
                    println!("Note: motor.pole_pairs is not set; pass --pole-pairs to `run`");
                }
            }
        }
    }
    Ok(())
}

/// Read, parse and validate the config; no file means all defaults.
fn load_config(path: Option<&Path>) -> Result<effcurve_config::Config> {
    let cfg = match path {
        Some(p) => {
            let text =
                std::fs::read_to_string(p).wrap_err_with(|| format!("read config {p:?}"))?;
            effcurve_config::load_toml(&text)
                .map_err(|e| CurveError::ConfigValidation(format!("parse {p:?}: {e}")))?
        }
        None => effcurve_config::Config::default(),
    };
    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &effcurve_config::Config) -> Result<()> {
    cfg.validate()
        .map_err(|e| CurveError::ConfigValidation(e.to_string()))?;
    Ok(())
}

/// Console layer (pretty or JSON, on stderr) plus an optional JSON file layer.
fn init_tracing(
    json: bool,
    cli_level: Option<&str>,
    logging: &effcurve_config::Logging,
) -> Result<Option<WorkerGuard>> {
    let level = cli_level.or(logging.level.as_deref()).unwrap_or("info");
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| CurveError::ConfigValidation(format!("log level {level:?}: {e}")))?,
    };

    let console_json = json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let console_pretty = (!json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    let mut guard = None;
    let file_layer = match logging.file.as_deref() {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|d| !d.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path.file_name().ok_or_else(|| {
                CurveError::ConfigValidation(format!("logging.file {file:?} has no file name"))
            })?;
            let appender = match logging.rotation.as_deref().unwrap_or("never") {
                "daily" => tracing_appender::rolling::daily(dir, name),
                "hourly" => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, g) = tracing_appender::non_blocking(appender);
            guard = Some(g);
            Some(fmt::layer().json().with_ansi(false).with_writer(writer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_json)
        .with(console_pretty)
        .with(file_layer)
        .try_init()
        .wrap_err("install tracing subscriber")?;
    Ok(guard)
}
