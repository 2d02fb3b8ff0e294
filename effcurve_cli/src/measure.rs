//! Measurement and offline analysis: config mapping, bench assembly and reporting.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use effcurve_core::error::Result as CoreResult;
use effcurve_core::{
    CsvExporter, CurveError, EfficiencyCurve, Exporter, RunParams, RunReport, Runner, SampleLog,
    SamplingEnd, analyze, export_all,
};
use effcurve_hardware::{SimParams, SimulatedBench};
use effcurve_traits::{AutoTrigger, Telemetry, Trigger};
use eyre::WrapErr;

use crate::cli::ExportArgs;
use crate::plot::PlotExporter;
use crate::trigger::StdinTrigger;

/// Simulated-bench parameters, with fault injection from `EFFCURVE_SIM_*`.
///
/// - EFFCURVE_SIM_SILENT_AFTER=N: controller stops answering after N frames
/// - EFFCURVE_SIM_DROP_EVERY=N: every N-th query goes unanswered
/// - EFFCURVE_SIM_REJECT_COMMAND=N: the N-th (0-based) ramp command is refused
/// - EFFCURVE_SIM_REJECT_STOP=1: stop commands are refused
/// - EFFCURVE_SIM_LINK_DOWN=1: every query fails
pub fn sim_params(pole_pairs: u32) -> SimParams {
    fn env_num<T: std::str::FromStr>(key: &str) -> Option<T> {
        std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
    }
    fn env_flag(key: &str) -> bool {
        std::env::var(key).is_ok_and(|v| matches!(v.trim(), "1" | "true" | "yes"))
    }
    SimParams {
        pole_pairs,
        silent_after: env_num("EFFCURVE_SIM_SILENT_AFTER"),
        drop_every: env_num("EFFCURVE_SIM_DROP_EVERY"),
        reject_command: env_num("EFFCURVE_SIM_REJECT_COMMAND"),
        reject_stop: env_flag("EFFCURVE_SIM_REJECT_STOP"),
        link_down: env_flag("EFFCURVE_SIM_LINK_DOWN"),
        ..SimParams::default()
    }
}

/// Exporters selected by flags, falling back to the `[export]` section.
pub fn exporters(cfg: &effcurve_config::ExportCfg, args: &ExportArgs) -> Vec<Box<dyn Exporter>> {
    let mut out: Vec<Box<dyn Exporter>> = Vec::new();
    let image = if args.no_plot {
        None
    } else {
        args.image
            .clone()
            .or_else(|| cfg.image.as_deref().map(PathBuf::from))
    };
    if let Some(path) = image {
        out.push(Box::new(PlotExporter::new(path)));
    }
    if let Some(path) = args
        .csv
        .clone()
        .or_else(|| cfg.csv.as_deref().map(PathBuf::from))
    {
        out.push(Box::new(CsvExporter::new(path)));
    }
    out
}

/// Full pipeline on the simulated bench.
pub fn run_measurement(
    params: RunParams,
    no_wait: bool,
    exporters: Vec<Box<dyn Exporter>>,
    shutdown: Arc<AtomicBool>,
) -> CoreResult<RunReport> {
    let bench = SimulatedBench::new(sim_params(params.pole_pairs.get()));
    let (telemetry, actuator) = bench.split();
    let trigger: Box<dyn Trigger> = if no_wait {
        Box::new(AutoTrigger)
    } else {
        Box::new(StdinTrigger)
    };

    tracing::info!(
        pole_pairs = params.pole_pairs.get(),
        target_duty = params.ramp.target_duty,
        "measurement start"
    );
    let mut runner = Runner::builder()
        .with_telemetry(telemetry)
        .with_actuator(actuator)
        .with_trigger(trigger)
        .with_params(params)
        .with_boxed_exporters(exporters)
        .with_cancel(shutdown)
        .build()?;
    runner.run()
}

/// Fit and export a recorded log.
pub fn run_analysis(
    log: &Path,
    exporters: &[Box<dyn Exporter>],
) -> CoreResult<(EfficiencyCurve, Option<CurveError>, Vec<CurveError>)> {
    let rows = effcurve_config::load_sample_log_csv(log)
        .wrap_err_with(|| format!("load sample log {log:?}"))?;
    let samples = SampleLog::from(rows.as_slice());
    tracing::info!(samples = samples.len(), path = ?log, "sample log loaded");
    let (curve, skipped) = analyze(samples);
    let export_errors = export_all(exporters, &curve);
    Ok((curve, skipped, export_errors))
}

/// Query the bench once; a link fault is a connection error.
///
/// The ping only reads current and voltage, so the bench runs with its own
/// pole-pair count regardless of configuration.
pub fn self_check() -> Result<bool, CurveError> {
    let bench = SimulatedBench::new(sim_params(SimParams::default().pole_pairs));
    let (mut telemetry, _actuator) = bench.split();
    match telemetry.query() {
        Ok(answer) => Ok(answer.is_some()),
        Err(e) => Err(CurveError::Connection(e.to_string())),
    }
}

fn end_name(end: &SamplingEnd) -> String {
    match end {
        SamplingEnd::Stopped(reason) => format!("stopped: {reason}"),
        SamplingEnd::RetryExhausted { attempts } => {
            format!("telemetry lost after {attempts} attempts")
        }
    }
}

/// One-line JSON summary of a curve.
pub fn curve_json(
    curve: &EfficiencyCurve,
    skipped: Option<&CurveError>,
    export_errors: &[CurveError],
) -> serde_json::Value {
    serde_json::json!({
        "samples": curve.samples.len(),
        "model": curve.model.map(|m| serde_json::json!({ "r_ohm": m.r_ohm, "c": m.c })),
        "peak": curve.peak().map(|p| serde_json::json!({
            "current_a": p.current,
            "efficiency_pct": p.efficiency,
        })),
        "skipped": skipped.map(ToString::to_string),
        "export_errors": export_errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
    })
}

pub fn report_json(report: &RunReport) -> serde_json::Value {
    let mut v = curve_json(
        &report.curve,
        report.skipped.as_ref(),
        &report.export_errors,
    );
    v["idle_current_a"] = serde_json::json!(report.idle_current_a);
    v["ramp_steps"] = serde_json::json!(report.ramp_duties.len());
    v["sampling_ms"] = serde_json::json!(report.sampling_ms);
    v["end"] = serde_json::json!(end_name(&report.sampling_end));
    v["shutdown_error"] = serde_json::json!(report.shutdown_error.as_ref().map(ToString::to_string));
    v["phases"] = serde_json::json!(
        report
            .phases
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
    );
    v
}

/// Pretty summary of a curve on stdout.
pub fn print_curve(
    curve: &EfficiencyCurve,
    skipped: Option<&CurveError>,
    export_errors: &[CurveError],
) {
    match (&curve.model, skipped) {
        (Some(m), _) => {
            println!("Fitted model: R = {:.4} ohm, c = {:.6}", m.r_ohm, m.c);
            if let Some(p) = curve.peak() {
                println!(
                    "Peak efficiency: {:.1} % at {:.1} A",
                    p.efficiency, p.current
                );
            }
        }
        (None, Some(reason)) => println!("Efficiency skipped: {reason}"),
        (None, None) => println!("Efficiency skipped"),
    }
    for e in export_errors {
        println!("Export warning: {e}");
    }
}

pub fn print_report(report: &RunReport) {
    println!(
        "Measurement complete: {} samples ({}), idle current {:.2} A",
        report.curve.samples.len(),
        end_name(&report.sampling_end),
        report.idle_current_a
    );
    print_curve(
        &report.curve,
        report.skipped.as_ref(),
        &report.export_errors,
    );
    if let Some(e) = &report.shutdown_error {
        println!("WARNING: stop command failed: {e}");
    }
}
