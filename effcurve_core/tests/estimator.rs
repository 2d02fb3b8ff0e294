use std::f64::consts::TAU;

use effcurve_core::{CurveError, MeasurementSample, ParameterEstimator, SampleLog};
use rstest::rstest;

/// Noise-free samples of `V = r·I + c·2π·rpm` with independent I and rpm.
fn synthetic(r: f64, c: f64, n: usize) -> SampleLog {
    (0..n)
        .map(|i| {
            let current = 2.0 + 3.5 * i as f64;
            let rpm = 7000.0 - 120.0 * i as f64 + if i % 2 == 0 { 35.0 } else { -20.0 };
            MeasurementSample::new(current, rpm, r * current + c * TAU * rpm)
        })
        .collect()
}

fn rel_err(got: f64, want: f64) -> f64 {
    ((got - want) / want).abs()
}

#[rstest]
#[case(0.05, 0.0005)]
#[case(0.12, 0.0021)]
#[case(0.008, 0.000_09)]
fn recovers_known_parameters(#[case] r0: f64, #[case] c0: f64) {
    let log = synthetic(r0, c0, 10);
    let m = ParameterEstimator::default().estimate(&log).unwrap();
    assert!(rel_err(m.r_ohm, r0) < 1e-6, "R = {}", m.r_ohm);
    assert!(rel_err(m.c, c0) < 1e-6, "c = {}", m.c);
}

#[rstest]
fn only_first_ten_samples_are_fitted() {
    let mut log = synthetic(0.05, 0.0005, 10);
    // Wildly different tail must not move the fit.
    for _ in 0..20 {
        log.push(MeasurementSample::new(50.0, 10.0, 1.0));
    }
    let m = ParameterEstimator::default().estimate(&log).unwrap();
    assert!(rel_err(m.r_ohm, 0.05) < 1e-6);
    assert!(rel_err(m.c, 0.0005) < 1e-6);
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(9)]
fn short_log_is_insufficient(#[case] n: usize) {
    let log = synthetic(0.05, 0.0005, n);
    assert_eq!(
        ParameterEstimator::default().estimate(&log),
        Err(CurveError::InsufficientData { have: n, need: 10 })
    );
}

#[rstest]
fn constant_rpm_window_still_yields_one_model() {
    // Collinear columns: minimum-norm solution, not an error.
    let log: SampleLog = (0..10)
        .map(|_| MeasurementSample::new(10.0, 5000.0, 20.0))
        .collect();
    let m = ParameterEstimator::default().estimate(&log).unwrap();
    let v = m.estimated_voltage(10.0, 5000.0);
    assert!((v - 20.0).abs() < 1e-6);
}
