//! Human-readable error descriptions, exit codes and structured JSON errors.

use effcurve_core::error::{BuildError, CurveError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingPolePairs => {
                "What happened: The motor's pole-pair count is not set.\nLikely causes: Neither --pole-pairs nor motor.pole_pairs was given.\nHow to fix: Pass the pole pairs (e.g., `effcurve run --pole-pairs 7`) or set [motor] pole_pairs in the config.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML or on the command line.\nHow to fix: Edit the config file or flags, then rerun."
            ),
        };
    }

    if let Some(ce) = err.downcast_ref::<CurveError>() {
        return match ce {
            CurveError::ConfigValidation(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML or on the command line.\nHow to fix: Edit the config file or flags, then rerun."
            ),
            CurveError::Connection(msg) => format!(
                "What happened: Could not talk to the motor controller ({msg}).\nLikely causes: Controller unpowered, cable unplugged, or wrong serial port.\nHow to fix: Check power and wiring, then run `effcurve self-check`."
            ),
            CurveError::ActuatorCommand(msg) => format!(
                "What happened: A duty-cycle command failed ({msg}). The motor was commanded to stop.\nLikely causes: Controller fault, lost link, or an out-of-range duty.\nHow to fix: Inspect the controller, lower ramp.target_duty if needed, and rerun."
            ),
            CurveError::Trigger(msg) => format!(
                "What happened: The start prompt could not be read ({msg}). The motor was commanded to stop.\nLikely causes: stdin is closed or not a terminal.\nHow to fix: Run interactively, or pass --no-wait for unattended runs."
            ),
            CurveError::Interrupted => {
                "What happened: The run was interrupted. The motor was commanded to stop.\nLikely causes: Ctrl-C was pressed.\nHow to fix: Start a new run when ready.".to_string()
            }
            // Recoverable kinds only reach here when a caller chose to escalate them
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    // String-based heuristics for errors coming from file loading
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("sample log csv must have headers") {
        return "Invalid headers in sample log CSV. Expected 'current,rpm,voltage'.".to_string();
    }

    if lower.contains("open sample log csv") {
        return format!(
            "What happened: The sample log could not be opened.\nLikely causes: Wrong path or missing permissions.\nHow to fix: Check the --log path. Original: {msg}"
        );
    }

    if lower.contains("invalid csv row") || lower.contains("non-finite") {
        return format!(
            "What happened: The sample log contains a malformed row.\nLikely causes: Hand-edited or truncated file.\nHow to fix: Fix or remove the row. Original: {msg}"
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable process exit codes: config 2, connection 3, actuator 4, interrupted 5, other 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<BuildError>().is_some() {
        return 2;
    }
    match err.downcast_ref::<CurveError>() {
        Some(CurveError::ConfigValidation(_)) => 2,
        Some(CurveError::Connection(_)) => 3,
        Some(CurveError::ActuatorCommand(_)) => 4,
        Some(CurveError::Interrupted) => 5,
        _ => 1,
    }
}

/// Stable reason name for JSON output.
pub fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() {
        return "ConfigValidation";
    }
    match err.downcast_ref::<CurveError>() {
        Some(CurveError::Connection(_)) => "Connection",
        Some(CurveError::ConfigValidation(_)) => "ConfigValidation",
        Some(CurveError::ActuatorCommand(_)) => "ActuatorCommand",
        Some(CurveError::TelemetryRetryExhausted { .. }) => "TelemetryRetryExhausted",
        Some(CurveError::InsufficientData { .. }) => "InsufficientData",
        Some(CurveError::DegenerateFit(_)) => "DegenerateFit",
        Some(CurveError::Export(_)) => "Export",
        Some(CurveError::Trigger(_)) => "Trigger",
        Some(CurveError::Interrupted) => "Interrupted",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}
