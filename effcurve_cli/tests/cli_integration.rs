use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// Minimal config with millisecond delays so sim runs finish quickly
fn write_fast_config(dir: &tempfile::TempDir, with_pole_pairs: bool) -> PathBuf {
    let motor = if with_pole_pairs {
        "[motor]\npole_pairs = 7\n"
    } else {
        ""
    };
    let toml = format!(
        r#"{motor}
[ramp]
settle_ms = 1
stabilize_ms = 1

[sampling]
cadence_ms = 1
retry_delay_ms = 1
"#
    );
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

#[rstest]
#[case(&["--help"], &[], 0, "Usage:", "stdout")]
#[case(&["run", "--no-wait", "--no-plot"], &[], 0, "Measurement complete", "stdout")]
#[case(&["run", "--no-wait", "--no-plot", "--target-duty", "1.5"], &[], 2, "target_duty", "stderr")]
#[case(&["run", "--no-wait", "--no-plot", "--pole-pairs", "0"], &[], 2, "pole_pairs", "stderr")]
#[case(&["run", "--no-wait", "--no-plot"], &[("EFFCURVE_SIM_LINK_DOWN", "1")], 3, "Could not talk", "stderr")]
#[case(&["run", "--no-wait", "--no-plot"], &[("EFFCURVE_SIM_REJECT_COMMAND", "3")], 4, "duty-cycle command failed", "stderr")]
#[case(&["self-check"], &[], 0, "OK", "stdout")]
#[case(&["self-check"], &[("EFFCURVE_SIM_LINK_DOWN", "1")], 3, "Could not talk", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] env: &[(&str, &str)],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir, true);

    let mut cmd = Command::cargo_bin("effcurve").unwrap();
    cmd.arg("--config").arg(&cfg);
    for (k, v) in env {
        cmd.env(k, v);
    }
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[rstest]
fn missing_pole_pairs_is_a_config_error() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir, false);

    Command::cargo_bin("effcurve")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .args(["run", "--no-wait", "--no-plot"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("pole_pairs"));
}

#[rstest]
fn self_check_without_pole_pairs_says_so() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir, false);

    Command::cargo_bin("effcurve")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("self-check")
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: config valid"))
        .stdout(predicate::str::contains("motor.pole_pairs is not set"));

    let with_pp = write_fast_config(&dir, true);
    Command::cargo_bin("effcurve")
        .unwrap()
        .arg("--config")
        .arg(&with_pp)
        .arg("self-check")
        .assert()
        .success()
        .stdout(predicate::str::contains("not set").not());
}

#[rstest]
fn pole_pairs_flag_fills_in_missing_config() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir, false);

    Command::cargo_bin("effcurve")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .args(["run", "--no-wait", "--no-plot", "--pole-pairs", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Peak efficiency"));
}

#[rstest]
fn enter_on_stdin_starts_the_measurement() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir, true);

    assert_cmd::Command::cargo_bin("effcurve")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .args(["run", "--no-plot"])
        .write_stdin("\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Measurement complete"))
        .stderr(predicate::str::contains("Press Enter"));
}

#[rstest]
fn closed_stdin_aborts_before_sampling() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir, true);

    assert_cmd::Command::cargo_bin("effcurve")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .args(["run", "--no-plot"])
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("start prompt could not be read"));
}

#[rstest]
fn silent_controller_completes_without_efficiency() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir, true);

    // Idle query plus five samples, then silence.
    Command::cargo_bin("effcurve")
        .unwrap()
        .env("EFFCURVE_SIM_SILENT_AFTER", "6")
        .arg("--config")
        .arg(&cfg)
        .args(["run", "--no-wait", "--no-plot"])
        .assert()
        .success()
        .stdout(predicate::str::contains("insufficient data: have 5 samples, need 10"));
}

#[rstest]
fn short_run_still_leaves_a_plot_behind() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir, true);
    let png = dir.path().join("short.png");

    Command::cargo_bin("effcurve")
        .unwrap()
        .env("EFFCURVE_SIM_SILENT_AFTER", "6")
        .arg("--config")
        .arg(&cfg)
        .args(["run", "--no-wait", "--image"])
        .arg(&png)
        .assert()
        .success()
        .stdout(predicate::str::contains("Export warning").not());

    assert!(png.exists(), "empty axes should still be written");
}

#[rstest]
fn run_csv_can_be_analyzed_again() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir, true);
    let csv = dir.path().join("curve.csv");

    Command::cargo_bin("effcurve")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .args(["run", "--no-wait", "--no-plot", "--csv"])
        .arg(&csv)
        .assert()
        .success();

    let text = fs::read_to_string(&csv).unwrap();
    assert!(text.starts_with("current,rpm,voltage,efficiency"));
    assert_eq!(text.lines().count(), 41);

    Command::cargo_bin("effcurve")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .args(["analyze", "--no-plot", "--log"])
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("Analyzed 40 samples"))
        .stdout(predicate::str::contains("Fitted model"));
}

#[rstest]
fn analyze_reports_bad_header() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir, true);
    let bad = dir.path().join("log.csv");
    fs::write(&bad, "amps,rpm,voltage\n1.0,5000,24.0\n").unwrap();

    Command::cargo_bin("effcurve")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .args(["analyze", "--no-plot", "--log"])
        .arg(&bad)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid headers"));
}

#[rstest]
fn plot_failure_never_fails_the_run() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir, true);
    let png = dir.path().join("curve.png");

    // Whether or not a font is available, the run itself succeeds.
    Command::cargo_bin("effcurve")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .args(["run", "--no-wait", "--image"])
        .arg(&png)
        .assert()
        .success();
}

#[rstest]
fn invalid_toml_exits_with_config_code() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("cfg.toml");
    fs::write(&cfg, "[ramp]\nstep = \"fast\"\n").unwrap();

    Command::cargo_bin("effcurve")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("self-check")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[rstest]
fn file_logging_writes_json_lines() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("effcurve.log");
    let cfg = dir.path().join("cfg.toml");
    fs::write(
        &cfg,
        format!(
            "[motor]\npole_pairs = 7\n[ramp]\nsettle_ms = 1\nstabilize_ms = 1\n[sampling]\ncadence_ms = 1\nretry_delay_ms = 1\n[logging]\nfile = {:?}\nlevel = \"info\"\n",
            log.to_string_lossy()
        ),
    )
    .unwrap();

    Command::cargo_bin("effcurve")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .args(["run", "--no-wait", "--no-plot"])
        .assert()
        .success();

    let text = fs::read_to_string(&log).unwrap();
    let first = text.lines().next().expect("log has lines");
    let v: serde_json::Value = serde_json::from_str(first).unwrap();
    assert!(v.get("level").is_some());
    assert!(text.contains("measurement start"));
}
