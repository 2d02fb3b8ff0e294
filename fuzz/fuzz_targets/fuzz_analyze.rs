#![no_main]
use effcurve_core::{MeasurementSample, SampleLog, analyze};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|rows: Vec<(f64, f64, f64)>| {
    let log: SampleLog = rows
        .iter()
        .map(|&(i, rpm, v)| MeasurementSample::new(i, rpm, v))
        .collect();
    let (curve, skipped) = analyze(log);
    assert_eq!(curve.points.is_empty(), skipped.is_some());
    for p in &curve.points {
        assert!((0.0..=100.0).contains(&p.efficiency));
    }
});
